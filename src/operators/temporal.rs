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

use chrono::{Datelike, NaiveDateTime, Weekday};
use serde_json::Value;

use crate::errors::Result;
use crate::operator::JiOperator;
use crate::record::{JiRecord, JiRecordBatch};
use crate::schema::{parse_timestamp, JiColumnResolver, JiColumnSet, JiField};

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days from `start` to `end`, floored, so one hour early is day -1.
pub fn whole_days(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    (end - start).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// English full name of a weekday.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// A day-count feature computed as `end - start`.
struct DurationFeature {
    output: String,
    start: String,
    end: String,
}

/// Derives delivery durations, delay and purchase calendar fields.
///
/// Each feature is computed only when both of its endpoint columns resolve;
/// rows with a null or malformed endpoint get a null metric. Existing
/// columns are never modified: a feature whose output column is already
/// present is skipped with a warning.
#[derive(Debug, Clone, Default)]
pub struct JiTemporalFeatures {
    resolver: JiColumnResolver,
}

impl JiTemporalFeatures {
    #[allow(non_snake_case)]
    pub fn new(resolver: JiColumnResolver) -> Self {
        Self { resolver }
    }

    fn duration_features(&self, columns: &JiColumnSet) -> Vec<DurationFeature> {
        let pairs = [
            (
                JiField::ApprovalToShipmentDays,
                JiField::ApprovedTimestamp,
                JiField::CarrierTimestamp,
            ),
            (
                JiField::DeliveryDays,
                JiField::PurchaseTimestamp,
                JiField::DeliveredTimestamp,
            ),
            (
                JiField::DeliveryDelayDays,
                JiField::EstimatedTimestamp,
                JiField::DeliveredTimestamp,
            ),
        ];

        pairs
            .into_iter()
            .filter_map(|(output, start, end)| {
                let start_column = self.resolver.resolve(columns, start);
                let end_column = self.resolver.resolve(columns, end);
                match (start_column, end_column) {
                    (Some(start), Some(end)) => self.fresh_output(columns, output).map(|output| {
                        DurationFeature {
                            output,
                            start: start.to_string(),
                            end: end.to_string(),
                        }
                    }),
                    _ => {
                        log::warn!(
                            "{}: {} skipped, needs {} and {}",
                            self.name(),
                            output.description(),
                            start.description(),
                            end.description()
                        );
                        None
                    }
                }
            })
            .collect()
    }

    /// Output column of `field`, unless the table already has it.
    fn fresh_output(&self, columns: &JiColumnSet, field: JiField) -> Option<String> {
        let output = self.resolver.canonical(field);
        if columns.contains(output) {
            log::warn!(
                "{}: column '{}' already present, {} not recomputed",
                self.name(),
                output,
                field.description()
            );
            return None;
        }
        Some(output.to_string())
    }

    fn timestamp(record: &JiRecord, column: &str) -> Option<NaiveDateTime> {
        record.get(column).and_then(parse_timestamp)
    }
}

impl JiOperator for JiTemporalFeatures {
    fn name(&self) -> &'static str {
        "temporal.features"
    }

    fn apply(&self, mut batch: JiRecordBatch) -> Result<JiRecordBatch> {
        let columns = JiColumnSet::from_batch(&batch);
        let durations = self.duration_features(&columns);
        let purchase = self
            .resolver
            .resolve_or_warn(&columns, JiField::PurchaseTimestamp, self.name())
            .map(str::to_string);

        let year = self.fresh_output(&columns, JiField::PurchaseYear);
        let month = self.fresh_output(&columns, JiField::PurchaseMonth);
        let weekday = self.fresh_output(&columns, JiField::PurchaseWeekday);

        for record in batch.iter_mut() {
            for feature in &durations {
                let start = Self::timestamp(record, &feature.start);
                let end = Self::timestamp(record, &feature.end);
                let days = match (start, end) {
                    (Some(start), Some(end)) => Value::from(whole_days(start, end)),
                    _ => Value::Null,
                };
                record.set(feature.output.clone(), days);
            }

            let Some(column) = &purchase else {
                continue;
            };
            let purchased = Self::timestamp(record, column);
            if let Some(year) = &year {
                record.set(year.clone(), purchased.map(|ts| Value::from(ts.year())).unwrap_or(Value::Null));
            }
            if let Some(month) = &month {
                let value = purchased.map(|ts| Value::String(ts.format("%Y-%m").to_string()));
                record.set(month.clone(), value.unwrap_or(Value::Null));
            }
            if let Some(weekday) = &weekday {
                let value = purchased.map(|ts| Value::String(weekday_name(ts.weekday()).to_string()));
                record.set(weekday.clone(), value.unwrap_or(Value::Null));
            }
        }

        log::info!(
            "{}: {} duration features over {} orders",
            self.name(),
            durations.len(),
            batch.len()
        );
        Ok(batch)
    }
}
