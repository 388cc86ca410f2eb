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

//! # Data Export Module
//!
//! Writes Ji tables as delimited text files.
//!
//! ## Module Components
//!
//! - **Writer** ([writer.rs](writer/index.html)): CSV writing with configurable
//!   delimiter and encoding, directory creation and atomic replace
//!
//! ## Usage Patterns
//!
//! ```rust,ignore
//! use jix::config::JiCsvOptions;
//! use jix::export::JiCsvWriter;
//!
//! let writer = JiCsvWriter::new(JiCsvOptions::default());
//! let stats = writer.write(&batch, std::path::Path::new("outputs/ordini.csv"))?;
//! ```

pub mod writer;

pub use writer::{JiCsvWriter, JiWriteStats};
