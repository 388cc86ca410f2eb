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

//! # Ji Error Module
//!
//! This module defines the error types used throughout the Ji framework.
//!
//! ## Hard and Soft Failures
//!
//! Ji separates two kinds of failure:
//!
//! - **Hard failures** are returned as [`JiError`]: invalid configuration,
//!   unreadable config files, a pipeline run without any orders table.
//! - **Soft failures** (a missing file, a column that cannot be resolved, an
//!   empty child table) are never errors. Stages report them as
//!   [`crate::outcome::JiStageOutcome::Absent`] with a reason and the run
//!   continues with degraded output.
//!
//! ## Error Categories
//!
//! - **Io**: Filesystem errors
//! - **Schema**: Data structure and type mismatches
//! - **Validation**: Invalid parameters or configuration
//! - **Operator**: Failures in operator implementations
//! - **Pipeline**: Pipeline orchestration failures
//! - **Serde**: Serialization/deserialization errors
//! - **Csv**: CSV encoding and decoding errors
//! - **Internal**: Unexpected internal failures

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Ji.
pub type Result<T> = std::result::Result<T, JiError>;

/// Canonical error enumeration for Ji.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum JiError {
    /// Errors originating from filesystem IO.
    #[error("io error: {0}")]
    Io(String),

    /// Errors caused by malformed schema or incompatible data layout.
    #[error("schema error: {message}")]
    Schema { message: String },

    /// Validation errors triggered by invalid parameters or inputs.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Any failure raised by an operator implementation.
    #[error("operator '{operator}' failed: {message}")]
    Operator { operator: String, message: String },

    /// Failures that occur while orchestrating a pipeline.
    #[error("pipeline error at stage '{stage}': {message}")]
    Pipeline { stage: String, message: String },

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Errors raised while reading or writing CSV.
    #[error("csv error: {0}")]
    Csv(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for JiError {
    fn from(err: io::Error) -> Self {
        JiError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for JiError {
    fn from(err: serde_json::Error) -> Self {
        JiError::Serde(err.to_string())
    }
}

impl From<serde_yaml::Error> for JiError {
    fn from(err: serde_yaml::Error) -> Self {
        JiError::Serde(err.to_string())
    }
}

#[cfg(feature = "csv")]
impl From<csv::Error> for JiError {
    fn from(err: csv::Error) -> Self {
        JiError::Csv(err.to_string())
    }
}

impl JiError {
    /// Helper to construct simple validation errors.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        JiError::Validation {
            message: message.into(),
        }
    }

    /// Helper to construct schema errors.
    pub fn schema<T: Into<String>>(message: T) -> Self {
        JiError::Schema {
            message: message.into(),
        }
    }

    /// Helper to construct operator errors.
    pub fn operator(name: impl Into<String>, message: impl Into<String>) -> Self {
        JiError::Operator {
            operator: name.into(),
            message: message.into(),
        }
    }

    /// Helper to construct pipeline errors.
    pub fn pipeline(stage: impl Into<String>, message: impl Into<String>) -> Self {
        JiError::Pipeline {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        JiError::Internal(message.into())
    }
}
