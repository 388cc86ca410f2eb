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

use std::collections::HashSet;

use serde_json::Value;

use crate::errors::Result;
use crate::operator::JiOperator;
use crate::record::{JiRecord, JiRecordBatch};

static NULL: Value = Value::Null;

/// Drops duplicate rows, keeping the first occurrence.
///
/// With no key columns the whole row is compared; otherwise only the listed
/// columns are. A listed column missing from a row compares as null.
#[derive(Debug, Clone, Default)]
pub struct JiDeduplicate {
    columns: Vec<String>,
    label: Option<String>,
}

impl JiDeduplicate {
    #[allow(non_snake_case)]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            label: None,
        }
    }

    /// Table name used in the removal log line.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn fingerprint(&self, record: &JiRecord) -> String {
        if self.columns.is_empty() {
            return record.payload.to_string();
        }
        let cells: Vec<&Value> = self
            .columns
            .iter()
            .map(|column| record.get(column).unwrap_or(&NULL))
            .collect();
        serde_json::to_string(&cells).unwrap_or_default()
    }
}

/// Number of rows that repeat an earlier row exactly.
pub fn count_duplicates(batch: &[JiRecord]) -> usize {
    let mut seen = HashSet::with_capacity(batch.len());
    batch
        .iter()
        .filter(|record| !seen.insert(record.payload.to_string()))
        .count()
}

impl JiOperator for JiDeduplicate {
    fn name(&self) -> &'static str {
        "dedup.rows"
    }

    fn apply(&self, batch: JiRecordBatch) -> Result<JiRecordBatch> {
        let before = batch.len();
        let mut seen = HashSet::with_capacity(before);
        let out: JiRecordBatch = batch
            .into_iter()
            .filter(|record| seen.insert(self.fingerprint(record)))
            .collect();

        let removed = before - out.len();
        if removed > 0 {
            log::info!(
                "{}: {} duplicate rows removed from {}",
                self.name(),
                removed,
                self.label.as_deref().unwrap_or("table")
            );
        }
        Ok(out)
    }
}
