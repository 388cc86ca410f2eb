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

//! # Ji Operator Module
//!
//! Row-preserving table transformations (translation, coercion, currency
//! conversion, temporal features, binning, deduplication) implement the
//! [`JiOperator`] trait: they take a table by value and return a new table.
//! Stages that combine several tables (aggregation, unification, RFM
//! segmentation) expose their own entry points instead.
//!
//! ## Implementing Custom Operators
//!
//! ```rust
//! use jix::operator::JiOperator;
//! use jix::record::JiRecordBatch;
//! use jix::errors::Result;
//!
//! #[derive(Debug)]
//! struct TagSource;
//!
//! impl JiOperator for TagSource {
//!     fn name(&self) -> &'static str {
//!         "field.tag_source"
//!     }
//!
//!     fn apply(&self, mut batch: JiRecordBatch) -> Result<JiRecordBatch> {
//!         for record in &mut batch {
//!             record.set("source", serde_json::json!("olist"));
//!         }
//!         Ok(batch)
//!     }
//! }
//! ```

use crate::errors::{Result, JiError};
use crate::record::JiRecordBatch;

/// Contract shared by every table-to-table stage.
///
/// Operators are stateless and deterministic: the same input table always
/// yields the same output table.
pub trait JiOperator: std::fmt::Debug {
    /// Unique, human-readable name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Applies the operator to a table.
    fn apply(&self, batch: JiRecordBatch) -> Result<JiRecordBatch>;
}

/// Executes an operator, prefixing any failure with the operator name.
#[allow(non_snake_case)]
pub fn execute_operator(operator: &dyn JiOperator, batch: JiRecordBatch) -> Result<JiRecordBatch> {
    let rows = batch.len();
    let out = operator
        .apply(batch)
        .map_err(|err| JiError::operator(operator.name(), err.to_string()))?;
    log::debug!("{}: {} rows in, {} rows out", operator.name(), rows, out.len());
    Ok(out)
}
