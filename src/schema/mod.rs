//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Ji.
//! The Ji project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Schema Normalization
//!
//! Source tables arrive with inconsistent naming: raw exports use English
//! column names, translated intermediates use Italian ones, and derived
//! tables add their own columns. This module provides:
//!
//! - **resolve**: [`JiField`] logical fields and the [`JiColumnResolver`]
//!   that maps them to physical columns, per table
//! - **translate**: the [`JiTranslate`] operator (column rename plus
//!   categorical value remap)
//! - **coerce**: cell parsing helpers and the [`JiCoerce`] operator

pub mod coerce;
pub mod resolve;
pub mod translate;

pub use coerce::{number_value, parse_number, parse_timestamp, timestamp_value, JiCoerce, TIMESTAMP_FORMAT};
pub use resolve::{JiColumnResolver, JiColumnSet, JiField};
pub use translate::{value_map_from_table, JiTranslate, JiValueMaps};
