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

//! Cell parsing and type coercion.
//!
//! CSV ingest produces string cells. Stages read them through
//! [`parse_number`] and [`parse_timestamp`], which return `None` for nulls and
//! malformed values; [`JiCoerce`] rewrites whole columns so that dates become
//! canonical timestamp strings and numbers become JSON numbers. A malformed
//! cell becomes null and its row is kept.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Number, Value};

use crate::errors::Result;
use crate::operator::JiOperator;
use crate::record::JiRecordBatch;
use crate::schema::resolve::{JiColumnResolver, JiColumnSet, JiField};

/// Canonical timestamp layout written by Ji.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const TIMESTAMP_LAYOUTS: &[&str] = &[
    TIMESTAMP_FORMAT,
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses a timestamp cell. Date-only values are taken at midnight.
pub fn parse_timestamp(value: &Value) -> Option<NaiveDateTime> {
    let text = value.as_str()?.trim();
    if text.is_empty() {
        return None;
    }
    for layout in TIMESTAMP_LAYOUTS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.naive_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Renders a timestamp in [`TIMESTAMP_FORMAT`].
pub fn timestamp_value(ts: NaiveDateTime) -> Value {
    Value::String(ts.format(TIMESTAMP_FORMAT).to_string())
}

/// Parses a numeric cell. Non-finite values count as malformed.
pub fn parse_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// JSON number for `n`; integral values are stored as integers.
pub fn number_value(n: f64) -> Value {
    if !n.is_finite() {
        return Value::Null;
    }
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        return Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

/// Rewrites date columns to canonical timestamps and numeric columns to numbers.
#[derive(Debug, Clone, Default)]
pub struct JiCoerce {
    date_columns: Vec<String>,
    numeric_columns: Vec<String>,
}

impl JiCoerce {
    #[allow(non_snake_case)]
    pub fn new(date_columns: Vec<String>, numeric_columns: Vec<String>) -> Self {
        Self {
            date_columns,
            numeric_columns,
        }
    }

    /// Coerces every candidate name of the given fields, whichever is present.
    #[allow(non_snake_case)]
    pub fn from_fields(resolver: &JiColumnResolver, dates: &[JiField], numbers: &[JiField]) -> Self {
        let expand = |fields: &[JiField]| -> Vec<String> {
            fields
                .iter()
                .flat_map(|field| resolver.candidates(*field))
                .map(str::to_string)
                .collect()
        };
        Self::new(expand(dates), expand(numbers))
    }

    fn coerce_column<F>(batch: &mut JiRecordBatch, column: &str, convert: F) -> usize
    where
        F: Fn(&Value) -> Option<Value>,
    {
        let mut malformed = 0usize;
        for record in batch.iter_mut() {
            let Some(cell) = record.get(column) else {
                continue;
            };
            if cell.is_null() {
                continue;
            }
            let replacement = match convert(cell) {
                Some(value) => value,
                None => {
                    malformed += 1;
                    Value::Null
                }
            };
            record.set(column, replacement);
        }
        malformed
    }
}

impl JiOperator for JiCoerce {
    fn name(&self) -> &'static str {
        "schema.coerce"
    }

    fn apply(&self, mut batch: JiRecordBatch) -> Result<JiRecordBatch> {
        let columns = JiColumnSet::from_batch(&batch);

        for column in self.date_columns.iter().filter(|c| columns.contains(c)) {
            let malformed = Self::coerce_column(&mut batch, column, |cell| {
                parse_timestamp(cell).map(timestamp_value)
            });
            if malformed > 0 {
                log::warn!("{}: {} malformed dates in '{}' set to null", self.name(), malformed, column);
            }
        }

        for column in self.numeric_columns.iter().filter(|c| columns.contains(c)) {
            let malformed = Self::coerce_column(&mut batch, column, |cell| {
                parse_number(cell).map(number_value)
            });
            if malformed > 0 {
                log::warn!("{}: {} malformed numbers in '{}' set to null", self.name(), malformed, column);
            }
        }

        Ok(batch)
    }
}
