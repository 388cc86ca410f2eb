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

//! Child-table aggregation.
//!
//! Payments, order items and reviews hold many rows per order. A
//! [`JiChildAggregator`] collapses such a table to one row per order
//! identifier by applying a declared [`JiAggregation`] to each source column.
//! Columns are resolved per table; a column that is not present is skipped
//! without affecting the others.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::outcome::JiStageOutcome;
use crate::record::JiRecord;
use crate::schema::{
    number_value, parse_number, parse_timestamp, timestamp_value, JiColumnResolver, JiColumnSet,
    JiField,
};

/// Sentinel written for a categorical mode with no observed values.
pub const UNDEFINED_LABEL: &str = "non_definito";

static NULL: Value = Value::Null;

/// Reduction applied to the cells of one column within one order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JiAggregation {
    /// Numeric sum; a group with no numeric cells sums to zero.
    Sum,
    /// Numeric maximum, used for sequence and installment counters.
    Max,
    /// Most frequent value; ties go to the value seen first.
    Mode,
    /// Numeric mean; null when the group has no numeric cells.
    Mean,
    /// Count of non-null cells.
    Count,
    /// Earliest timestamp.
    Earliest,
    /// Latest timestamp.
    Latest,
}

impl JiAggregation {
    /// Reduces the cells of one group, given in original row order.
    pub fn reduce(self, cells: &[&Value], undefined: &str) -> Value {
        match self {
            JiAggregation::Sum => {
                let total: f64 = cells.iter().filter_map(|cell| parse_number(cell)).sum();
                number_value(total)
            }
            JiAggregation::Max => cells
                .iter()
                .filter_map(|cell| parse_number(cell))
                .fold(None, |acc: Option<f64>, n| Some(acc.map_or(n, |m| m.max(n))))
                .map(number_value)
                .unwrap_or(Value::Null),
            JiAggregation::Mean => {
                let numbers: Vec<f64> = cells.iter().filter_map(|cell| parse_number(cell)).collect();
                if numbers.is_empty() {
                    Value::Null
                } else {
                    number_value(numbers.iter().sum::<f64>() / numbers.len() as f64)
                }
            }
            JiAggregation::Count => {
                Value::from(cells.iter().filter(|cell| !cell.is_null()).count())
            }
            JiAggregation::Mode => mode(cells).unwrap_or_else(|| Value::String(undefined.to_string())),
            JiAggregation::Earliest => cells
                .iter()
                .filter_map(|cell| parse_timestamp(cell))
                .min()
                .map(timestamp_value)
                .unwrap_or(Value::Null),
            JiAggregation::Latest => cells
                .iter()
                .filter_map(|cell| parse_timestamp(cell))
                .max()
                .map(timestamp_value)
                .unwrap_or(Value::Null),
        }
    }
}

/// Most frequent non-null cell. Among values tied for the highest count the
/// one that occurs first wins.
fn mode(cells: &[&Value]) -> Option<Value> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, cell) in cells.iter().enumerate() {
        if cell.is_null() {
            continue;
        }
        let entry = counts.entry(cell_key(cell)).or_insert((position, 0));
        entry.1 += 1;
    }
    counts
        .into_values()
        .max_by(|(first_a, count_a), (first_b, count_b)| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(first, _)| cells[first].clone())
}

fn cell_key(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One declared aggregate: `source` is reduced with `aggregation` into `output`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JiAggregateColumn {
    pub source: JiField,
    pub output: JiField,
    pub aggregation: JiAggregation,
}

impl JiAggregateColumn {
    #[allow(non_snake_case)]
    pub fn new(source: JiField, output: JiField, aggregation: JiAggregation) -> Self {
        Self {
            source,
            output,
            aggregation,
        }
    }
}

/// Sum of already aggregated outputs, missing parts counted as zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JiCombinedTotal {
    pub parts: Vec<JiField>,
    pub output: JiField,
}

/// Collapses a child table to one row per order identifier.
#[derive(Clone, Debug)]
pub struct JiChildAggregator {
    stage: String,
    key: JiField,
    columns: Vec<JiAggregateColumn>,
    combined: Option<JiCombinedTotal>,
    resolver: JiColumnResolver,
    undefined_label: String,
}

impl JiChildAggregator {
    #[allow(non_snake_case)]
    pub fn new(stage: impl Into<String>, columns: Vec<JiAggregateColumn>) -> Self {
        Self {
            stage: stage.into(),
            key: JiField::OrderId,
            columns,
            combined: None,
            resolver: JiColumnResolver::default(),
            undefined_label: UNDEFINED_LABEL.to_string(),
        }
    }

    /// Payments: principal type, totals, installments and payment count.
    #[allow(non_snake_case)]
    pub fn payments() -> Self {
        use JiAggregation::*;
        Self::new(
            "aggregate.payments",
            vec![
                JiAggregateColumn::new(JiField::PaymentType, JiField::PrincipalPaymentType, Mode),
                JiAggregateColumn::new(JiField::PaymentValue, JiField::PaymentTotal, Sum),
                JiAggregateColumn::new(JiField::PaymentValueEur, JiField::PaymentTotalEur, Sum),
                JiAggregateColumn::new(JiField::PaymentInstallments, JiField::MaxInstallments, Max),
                JiAggregateColumn::new(JiField::PaymentSequence, JiField::PaymentCount, Max),
            ],
        )
    }

    /// Order items: item count, price and freight totals, EUR order total.
    #[allow(non_snake_case)]
    pub fn items() -> Self {
        use JiAggregation::*;
        Self::new(
            "aggregate.items",
            vec![
                JiAggregateColumn::new(JiField::ProductId, JiField::ItemCount, Count),
                JiAggregateColumn::new(JiField::Price, JiField::PriceTotal, Sum),
                JiAggregateColumn::new(JiField::Freight, JiField::FreightTotal, Sum),
                JiAggregateColumn::new(JiField::PriceEur, JiField::PriceEur, Sum),
                JiAggregateColumn::new(JiField::FreightEur, JiField::FreightEur, Sum),
            ],
        )
        .with_combined_total(JiCombinedTotal {
            parts: vec![JiField::PriceEur, JiField::FreightEur],
            output: JiField::OrderTotalEur,
        })
    }

    /// Reviews: mean score, review count, first creation and last answer.
    #[allow(non_snake_case)]
    pub fn reviews() -> Self {
        use JiAggregation::*;
        Self::new(
            "aggregate.reviews",
            vec![
                JiAggregateColumn::new(JiField::ReviewScore, JiField::ReviewScoreMean, Mean),
                JiAggregateColumn::new(JiField::ReviewId, JiField::ReviewCount, Count),
                JiAggregateColumn::new(JiField::ReviewCreated, JiField::FirstReviewCreated, Earliest),
                JiAggregateColumn::new(JiField::ReviewAnswered, JiField::LastReviewAnswered, Latest),
            ],
        )
    }

    pub fn with_resolver(mut self, resolver: JiColumnResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_undefined_label(mut self, label: impl Into<String>) -> Self {
        self.undefined_label = label.into();
        self
    }

    pub fn with_combined_total(mut self, combined: JiCombinedTotal) -> Self {
        self.combined = Some(combined);
        self
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    pub fn columns(&self) -> &[JiAggregateColumn] {
        &self.columns
    }

    /// Aggregates `batch`, or reports why no aggregate could be produced.
    pub fn aggregate(&self, batch: &[JiRecord]) -> JiStageOutcome {
        if batch.is_empty() {
            log::warn!("{}: input table is empty", self.stage);
            return JiStageOutcome::absent(&self.stage, "input table is empty");
        }

        let columns = JiColumnSet::from_batch(batch);
        let Some(key_column) = self.resolver.resolve(&columns, self.key) else {
            let reason = format!(
                "no column for {} (tried {:?})",
                self.key.description(),
                self.resolver.candidates(self.key)
            );
            log::error!("{}: {}", self.stage, reason);
            return JiStageOutcome::absent(&self.stage, reason);
        };

        let resolved: Vec<(&JiAggregateColumn, &str)> = self
            .columns
            .iter()
            .filter_map(|column| {
                let physical = self.resolver.resolve(&columns, column.source);
                if physical.is_none() {
                    log::warn!(
                        "{}: {} not found, {} skipped",
                        self.stage,
                        column.source.description(),
                        column.output.description()
                    );
                }
                physical.map(|name| (column, name))
            })
            .collect();
        if resolved.is_empty() {
            let reason = "none of the aggregated columns is present".to_string();
            log::error!("{}: {}", self.stage, reason);
            return JiStageOutcome::absent(&self.stage, reason);
        }

        let (groups, orphans) = group_rows(batch, key_column);
        if orphans > 0 {
            log::warn!("{}: {} rows without {} ignored", self.stage, orphans, self.key.description());
        }

        let key_output = self.resolver.canonical(self.key).to_string();
        let combined = self.combined.as_ref().filter(|combined| {
            combined
                .parts
                .iter()
                .all(|part| resolved.iter().any(|(column, _)| column.output == *part))
        });

        let rows: Vec<JiRecord> = groups
            .into_iter()
            .map(|(key, members)| {
                let mut row = Map::new();
                let key_cell = batch[members[0]]
                    .get(key_column)
                    .cloned()
                    .unwrap_or(Value::Null);
                row.insert(key_output.clone(), key_cell);

                for (column, physical) in &resolved {
                    let cells: Vec<&Value> = members
                        .iter()
                        .map(|&index| batch[index].get(physical).unwrap_or(&NULL))
                        .collect();
                    let value = column.aggregation.reduce(&cells, &self.undefined_label);
                    row.insert(self.resolver.canonical(column.output).to_string(), value);
                }

                if let Some(combined) = combined {
                    let total: f64 = combined
                        .parts
                        .iter()
                        .filter_map(|part| row.get(self.resolver.canonical(*part)))
                        .filter_map(parse_number)
                        .sum();
                    row.insert(
                        self.resolver.canonical(combined.output).to_string(),
                        number_value(total),
                    );
                }

                JiRecord::new(Some(key), Value::Object(row))
            })
            .collect();

        log::info!(
            "{}: {} rows aggregated into {} orders ({} columns)",
            self.stage,
            batch.len(),
            rows.len(),
            resolved.len()
        );
        JiStageOutcome::Present(rows)
    }
}

/// Row indices per key in order of first appearance, plus the number of
/// rows without a key.
fn group_rows(batch: &[JiRecord], key_column: &str) -> (Vec<(String, Vec<usize>)>, usize) {
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut orphans = 0usize;
    for (position, record) in batch.iter().enumerate() {
        let Some(key) = record.key(key_column) else {
            orphans += 1;
            continue;
        };
        match index.get(&key) {
            Some(&slot) => groups[slot].1.push(position),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![position]));
            }
        }
    }
    (groups, orphans)
}
