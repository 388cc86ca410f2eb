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

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::operators::dedup::count_duplicates;
use crate::record::JiRecord;
use crate::schema::{parse_timestamp, JiColumnSet};

/// Missing-value count of one column.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JiColumnQuality {
    pub name: String,
    pub kind: String,
    pub missing: usize,
}

/// Basic data-quality figures of one table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JiQualityReport {
    pub table: String,
    pub rows: usize,
    pub columns: usize,
    pub missing_total: usize,
    pub duplicate_rows: usize,
    pub column_quality: Vec<JiColumnQuality>,
    /// Number of columns per inferred kind.
    pub kind_distribution: BTreeMap<String, usize>,
}

impl JiQualityReport {
    #[allow(non_snake_case)]
    pub fn from_batch(table: impl Into<String>, batch: &[JiRecord]) -> Self {
        let columns = JiColumnSet::from_batch(batch);
        let column_quality: Vec<JiColumnQuality> = columns
            .names()
            .iter()
            .map(|name| {
                let cells: Vec<Option<&Value>> = batch.iter().map(|r| r.get_present(name)).collect();
                JiColumnQuality {
                    name: name.clone(),
                    kind: column_kind(cells.iter().flatten().copied()).to_string(),
                    missing: cells.iter().filter(|cell| cell.is_none()).count(),
                }
            })
            .collect();

        let mut kind_distribution = BTreeMap::new();
        for column in &column_quality {
            *kind_distribution.entry(column.kind.clone()).or_insert(0) += 1;
        }

        Self {
            table: table.into(),
            rows: batch.len(),
            columns: columns.len(),
            missing_total: column_quality.iter().map(|c| c.missing).sum(),
            duplicate_rows: count_duplicates(batch),
            column_quality,
            kind_distribution,
        }
    }

    /// Writes the report to the log at info level.
    pub fn log(&self) {
        log::info!(
            "quality {}: {} rows x {} columns, {} missing values, {} duplicate rows, kinds {:?}",
            self.table,
            self.rows,
            self.columns,
            self.missing_total,
            self.duplicate_rows,
            self.kind_distribution
        );
        for column in self.column_quality.iter().filter(|c| c.missing > 0) {
            log::debug!("quality {}: '{}' missing {}", self.table, column.name, column.missing);
        }
    }
}

/// Kind shared by every non-null cell, `mixed` otherwise.
fn column_kind<'a>(cells: impl Iterator<Item = &'a Value>) -> &'static str {
    let mut kind: Option<&'static str> = None;
    for cell in cells {
        let current = match cell {
            Value::Bool(_) => "bool",
            Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
            Value::Number(_) => "float",
            Value::String(_) if parse_timestamp(cell).is_some() => "timestamp",
            Value::String(_) => "string",
            _ => "nested",
        };
        match kind {
            None => kind = Some(current),
            Some(previous) if previous == current => {}
            Some(_) => return "mixed",
        }
    }
    kind.unwrap_or("empty")
}
