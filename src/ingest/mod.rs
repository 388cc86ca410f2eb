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

//! # Data Ingestion Module
//!
//! Reads the source tables of the pipeline from delimited text files.
//!
//! ## Module Components
//!
//! - **Reader** ([reader.rs](reader/index.html)): CSV reading with configurable
//!   delimiter and any labelled encoding (UTF-8, Latin-1, windows-1252, ...)
//!
//! ## Usage Patterns
//!
//! ```rust,ignore
//! use jix::config::JiCsvOptions;
//! use jix::ingest::JiCsvReader;
//!
//! let reader = JiCsvReader::new(JiCsvOptions::default());
//! let orders = reader.read_path(std::path::Path::new("data/olist_orders_dataset.csv"));
//! if let Some(reason) = orders.reason() {
//!     eprintln!("orders unavailable: {}", reason);
//! }
//! ```

pub mod reader;

pub use reader::{decode, JiCsvReader};
