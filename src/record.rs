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

//! # Ji Record Module
//!
//! A table in Ji is a [`JiRecordBatch`]: one [`JiRecord`] per row. The row
//! payload is a JSON object whose keys are the table's physical column names.
//! Column order follows insertion order, so a table read from a CSV file keeps
//! its header order through every stage.
//!
//! ## Usage Example
//!
//! ```rust
//! use jix::record::JiRecord;
//! use serde_json::json;
//!
//! let mut row = JiRecord::new(Some("0".to_string()), json!({"id_ordine": "o1"}));
//! row.set("stato_ordine", json!("consegnato"));
//! assert_eq!(row.get("stato_ordine"), Some(&json!("consegnato")));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Generic metadata map that may accompany a record.
pub type JiMetadata = Map<String, Value>;

/// One row of a Ji table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JiRecord {
    /// Optional stable identifier for the row.
    ///
    /// Readers assign the source row index; aggregators assign the group key.
    pub id: Option<String>,

    /// Column name to cell value. Always a JSON object for tabular data.
    pub payload: Value,

    /// Additional attributes such as provenance. Skipped when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JiMetadata>,
}

impl JiRecord {
    /// Constructs a record with the given payload and optional identifier.
    #[allow(non_snake_case)]
    pub fn new(id: impl Into<Option<String>>, payload: Value) -> Self {
        JiRecord {
            id: id.into(),
            payload,
            metadata: None,
        }
    }

    /// Attaches metadata to the record.
    #[allow(non_snake_case)]
    pub fn with_metadata(mut self, metadata: JiMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Returns the cell stored under `column`, if the payload has it.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.payload.as_object().and_then(|row| row.get(column))
    }

    /// Returns the cell under `column` unless it is missing or null.
    pub fn get_present(&self, column: &str) -> Option<&Value> {
        self.get(column).filter(|value| !value.is_null())
    }

    /// Writes a cell, turning a non-object payload into an object first.
    pub fn set(&mut self, column: impl Into<String>, value: Value) {
        if let Value::Object(row) = &mut self.payload {
            row.insert(column.into(), value);
            return;
        }

        let mut row = Map::new();
        let previous = std::mem::take(&mut self.payload);
        if !previous.is_null() {
            row.insert("value".to_string(), previous);
        }
        row.insert(column.into(), value);
        self.payload = Value::Object(row);
    }

    /// Textual key used when a cell acts as a join or group key.
    ///
    /// Strings are used verbatim and numbers through their JSON rendering, so
    /// `"42"` read from CSV and `42` produced by coercion match. Null and
    /// empty strings yield `None`.
    pub fn key(&self, column: &str) -> Option<String> {
        match self.get_present(column)? {
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }
}

/// Convenience alias for working on tables.
pub type JiRecordBatch = Vec<JiRecord>;
