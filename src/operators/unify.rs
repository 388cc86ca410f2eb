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

//! Left joins of child aggregates and customers onto the orders table.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::errors::{JiError, Result};
use crate::outcome::JiStageOutcome;
use crate::record::{JiRecord, JiRecordBatch};
use crate::schema::{JiColumnResolver, JiColumnSet, JiField};

/// Merges child aggregates into the orders table.
///
/// Every order row is kept exactly once. Aggregate rows whose order is not
/// in the base table are dropped; orders without a matching aggregate get
/// null aggregate columns, or the registered default for that field.
#[derive(Clone, Debug, Default)]
pub struct JiDatasetUnifier {
    resolver: JiColumnResolver,
    defaults: Vec<(JiField, Value)>,
}

impl JiDatasetUnifier {
    #[allow(non_snake_case)]
    pub fn new(resolver: JiColumnResolver) -> Self {
        Self {
            resolver,
            defaults: Vec::new(),
        }
    }

    /// Value written into `field` when an order has no aggregate for it.
    pub fn with_default(mut self, field: JiField, value: Value) -> Self {
        self.defaults.push((field, value));
        self
    }

    /// Left-joins every present aggregate onto `orders` by order identifier.
    ///
    /// Fails only when the orders table has no order identifier column.
    pub fn unify(&self, orders: &[JiRecord], aggregates: &[JiStageOutcome]) -> Result<JiRecordBatch> {
        let order_columns = JiColumnSet::from_batch(orders);
        let order_key = self
            .resolver
            .resolve(&order_columns, JiField::OrderId)
            .ok_or_else(|| {
                JiError::schema(format!(
                    "orders table has no {} (tried {:?})",
                    JiField::OrderId.description(),
                    self.resolver.candidates(JiField::OrderId)
                ))
            })?
            .to_string();

        let mut unified: JiRecordBatch = orders.to_vec();
        for outcome in aggregates {
            match outcome {
                JiStageOutcome::Present(aggregate) => {
                    let columns = JiColumnSet::from_batch(aggregate);
                    let Some(aggregate_key) = self.resolver.resolve(&columns, JiField::OrderId) else {
                        log::warn!("unify: aggregate without {}, skipped", JiField::OrderId.description());
                        continue;
                    };
                    unified = left_join(unified, &order_key, aggregate, aggregate_key, "unify");
                }
                JiStageOutcome::Absent { stage, reason } => {
                    log::warn!("unify: {} unavailable ({}), its columns are omitted", stage, reason);
                }
            }
        }

        self.apply_defaults(&mut unified);
        log::info!(
            "unify: {} orders, {} columns",
            unified.len(),
            JiColumnSet::from_batch(&unified).len()
        );
        Ok(unified)
    }

    /// Adds customer attributes reached through the customer identifier.
    ///
    /// Customers are deduplicated on their identifier, keeping the first row.
    /// When either table lacks the identifier the orders are returned as-is.
    pub fn join_customers(&self, orders: JiRecordBatch, customers: &[JiRecord]) -> JiRecordBatch {
        let order_columns = JiColumnSet::from_batch(&orders);
        let customer_columns = JiColumnSet::from_batch(customers);
        let order_key = self
            .resolver
            .resolve_or_warn(&order_columns, JiField::CustomerId, "unify.customers")
            .map(str::to_string);
        let customer_key = self
            .resolver
            .resolve_or_warn(&customer_columns, JiField::CustomerId, "unify.customers");
        match (order_key, customer_key) {
            (Some(order_key), Some(customer_key)) => {
                left_join(orders, &order_key, customers, customer_key, "unify.customers")
            }
            _ => orders,
        }
    }

    fn apply_defaults(&self, batch: &mut JiRecordBatch) {
        if self.defaults.is_empty() {
            return;
        }
        let columns = JiColumnSet::from_batch(batch);
        for (field, default) in &self.defaults {
            let Some(column) = self.resolver.resolve(&columns, *field) else {
                continue;
            };
            let mut filled = 0usize;
            for record in batch.iter_mut() {
                if record.get_present(column).is_none() {
                    record.set(column, default.clone());
                    filled += 1;
                }
            }
            if filled > 0 {
                log::debug!("unify: {} rows defaulted in '{}'", filled, column);
            }
        }
    }
}

/// Left join on a single key. The right side keeps its first row per key;
/// right columns that already exist on the left are not copied.
fn left_join(
    left: JiRecordBatch,
    left_key: &str,
    right: &[JiRecord],
    right_key: &str,
    stage: &str,
) -> JiRecordBatch {
    let left_columns = JiColumnSet::from_batch(&left);
    let right_columns = JiColumnSet::from_batch(right);

    let added: Vec<&str> = right_columns
        .names()
        .iter()
        .map(String::as_str)
        .filter(|name| *name != right_key)
        .filter(|name| {
            let collides = left_columns.contains(name);
            if collides {
                log::warn!("{}: column '{}' already present, keeping existing values", stage, name);
            }
            !collides
        })
        .collect();

    let mut lookup: HashMap<String, &Map<String, Value>> = HashMap::new();
    let mut duplicates = 0usize;
    for record in right {
        let (Some(key), Some(row)) = (record.key(right_key), record.payload.as_object()) else {
            continue;
        };
        if lookup.contains_key(&key) {
            duplicates += 1;
        } else {
            lookup.insert(key, row);
        }
    }
    if duplicates > 0 {
        log::warn!("{}: {} duplicate keys on the joined table ignored", stage, duplicates);
    }

    let mut matched = 0usize;
    let out: JiRecordBatch = left
        .into_iter()
        .map(|mut record| {
            let found = record.key(left_key).and_then(|key| lookup.get(&key).copied());
            if found.is_some() {
                matched += 1;
            }
            for column in &added {
                let value = found
                    .and_then(|row| row.get(*column))
                    .cloned()
                    .unwrap_or(Value::Null);
                record.set(*column, value);
            }
            record
        })
        .collect();

    log::info!(
        "{}: {} of {} rows matched on '{}', {} columns added",
        stage,
        matched,
        out.len(),
        left_key,
        added.len()
    );
    out
}
