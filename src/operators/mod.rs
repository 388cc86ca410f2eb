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

//! # Operators Module
//!
//! The table stages of the Ji unification pipeline.
//!
//! ## Operator Categories
//!
//! - **aggregate**: Child-table aggregation (payments, items, reviews)
//! - **binning**: Numeric-to-category discretization
//! - **currency**: Converted-currency columns
//! - **dedup**: Duplicate row removal
//! - **rfm**: Customer RFM scoring and segmentation
//! - **temporal**: Delivery durations and purchase calendar fields
//! - **unify**: Left joins onto the orders table
//!
//! ## Usage
//!
//! Row-preserving stages implement [`crate::operator::JiOperator`]. The
//! aggregator, the unifier and the segmenter take several tables or return
//! richer results and expose their own entry points.

pub mod aggregate;
pub mod binning;
pub mod currency;
pub mod dedup;
pub mod rfm;
pub mod temporal;
pub mod unify;

pub use aggregate::{JiAggregateColumn, JiAggregation, JiChildAggregator, JiCombinedTotal, UNDEFINED_LABEL};
pub use binning::{JiBinSpec, JiBinner};
pub use currency::{JiCurrencyConvert, DEFAULT_CONVERSION_RATE};
pub use dedup::{count_duplicates, JiDeduplicate};
pub use rfm::{quantile_scores, JiRfmOutcome, JiRfmRecord, JiRfmSegmenter, JiSegment, JiSegmentStats};
pub use temporal::{weekday_name, whole_days, JiTemporalFeatures};
pub use unify::JiDatasetUnifier;
