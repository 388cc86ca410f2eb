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

use serde::{Deserialize, Serialize};

use crate::record::JiRecord;
use crate::schema::{parse_timestamp, JiColumnResolver, JiColumnSet, JiField, TIMESTAMP_FORMAT};

/// Final figures of the unified table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JiDatasetSummary {
    pub rows: usize,
    pub columns: usize,
    pub unique_orders: Option<usize>,
    pub unique_customers: Option<usize>,
    /// Earliest and latest purchase timestamp.
    pub purchase_period: Option<(String, String)>,
}

impl JiDatasetSummary {
    #[allow(non_snake_case)]
    pub fn from_batch(batch: &[JiRecord], resolver: &JiColumnResolver) -> Self {
        let columns = JiColumnSet::from_batch(batch);
        let distinct = |field: JiField| {
            resolver.resolve(&columns, field).map(|column| {
                batch
                    .iter()
                    .filter_map(|r| r.key(column))
                    .collect::<HashSet<_>>()
                    .len()
            })
        };

        let purchase_period = resolver
            .resolve(&columns, JiField::PurchaseTimestamp)
            .and_then(|column| {
                let stamps = batch
                    .iter()
                    .filter_map(|r| r.get(column).and_then(parse_timestamp));
                stamps.fold(None, |range, ts| match range {
                    None => Some((ts, ts)),
                    Some((lo, hi)) => Some((ts.min(lo), ts.max(hi))),
                })
            })
            .map(|(lo, hi)| {
                (
                    lo.format(TIMESTAMP_FORMAT).to_string(),
                    hi.format(TIMESTAMP_FORMAT).to_string(),
                )
            });

        Self {
            rows: batch.len(),
            columns: columns.len(),
            unique_orders: distinct(JiField::OrderId),
            unique_customers: distinct(JiField::CustomerId),
            purchase_period,
        }
    }

    pub fn log(&self) {
        log::info!(
            "final dataset: {} rows x {} columns, {} orders, {} customers, period {}",
            self.rows,
            self.columns,
            count_text(self.unique_orders),
            count_text(self.unique_customers),
            self.purchase_period
                .as_ref()
                .map(|(lo, hi)| format!("{} to {}", lo, hi))
                .unwrap_or_else(|| "n/a".to_string())
        );
    }
}

fn count_text(count: Option<usize>) -> String {
    count.map(|n| n.to_string()).unwrap_or_else(|| "n/a".to_string())
}
