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

//! # Customer RFM Segmentation
//!
//! Scores every customer on recency, frequency and monetary value and
//! assigns a segment label that is broadcast back onto each of the
//! customer's orders.
//!
//! ## Scoring
//!
//! Customers are listed in ascending identifier order. Each metric is ranked
//! with first-occurrence tie breaking (equal values keep the list order, they
//! are never averaged) and the ranks are cut into five equal-frequency
//! groups. Frequency and monetary score 1..5 from low to high; recency scores
//! inversely, so the most recent customer gets 5. Repeated quantile edges
//! are collapsed instead of failing, so a single customer scores in the
//! lowest group.
//!
//! ## Segments
//!
//! The first matching rule wins:
//!
//! | frequency score | monetary score | segment            |
//! |-----------------|----------------|--------------------|
//! | >= 4            | >= 4           | `High Value`       |
//! | >= 3            | >= 3           | `Medium Value`     |
//! | <= 2            | <= 2           | `Low Value`        |
//! | otherwise       |                | `Medium-Low Value` |

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::operators::binning::JiBinSpec;
use crate::record::JiRecordBatch;
use crate::schema::{parse_number, parse_timestamp, JiColumnResolver, JiColumnSet, JiField};

const SCORE_GROUPS: usize = 5;

/// Monetary columns in priority order.
pub const MONETARY_FALLBACK: [JiField; 3] = [
    JiField::OrderTotalEur,
    JiField::PaymentTotalEur,
    JiField::PaymentTotal,
];

/// Customer value tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JiSegment {
    #[serde(rename = "High Value")]
    HighValue,
    #[serde(rename = "Medium Value")]
    MediumValue,
    #[serde(rename = "Low Value")]
    LowValue,
    #[serde(rename = "Medium-Low Value")]
    MediumLowValue,
}

impl JiSegment {
    /// Applies the segment rules to a frequency and a monetary score.
    pub fn classify(f_score: u8, m_score: u8) -> Self {
        if f_score >= 4 && m_score >= 4 {
            JiSegment::HighValue
        } else if f_score >= 3 && m_score >= 3 {
            JiSegment::MediumValue
        } else if f_score <= 2 && m_score <= 2 {
            JiSegment::LowValue
        } else {
            JiSegment::MediumLowValue
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            JiSegment::HighValue => "High Value",
            JiSegment::MediumValue => "Medium Value",
            JiSegment::LowValue => "Low Value",
            JiSegment::MediumLowValue => "Medium-Low Value",
        }
    }
}

impl fmt::Display for JiSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-customer metrics, scores and segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JiRfmRecord {
    pub customer_id: String,
    /// Days from the customer's latest purchase to the reference date;
    /// `None` when none of the customer's purchase timestamps is valid.
    pub recency_days: Option<i64>,
    pub frequency: usize,
    pub monetary: f64,
    pub r_score: Option<u8>,
    pub f_score: u8,
    pub m_score: u8,
    pub segment: JiSegment,
}

/// Segment distribution over customers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JiSegmentStats {
    pub total_customers: usize,
    pub customers_per_segment: BTreeMap<String, usize>,
}

impl JiSegmentStats {
    #[allow(non_snake_case)]
    pub fn from_customers(customers: &[JiRfmRecord]) -> Self {
        let mut customers_per_segment = BTreeMap::new();
        for customer in customers {
            *customers_per_segment
                .entry(customer.segment.label().to_string())
                .or_insert(0) += 1;
        }
        Self {
            total_customers: customers.len(),
            customers_per_segment,
        }
    }
}

/// Result of a segmentation run.
///
/// When the segmenter cannot run, `table` is the input unchanged,
/// `customers` is empty and `skipped` carries the reason.
#[derive(Clone, Debug, PartialEq)]
pub struct JiRfmOutcome {
    pub table: JiRecordBatch,
    pub customers: Vec<JiRfmRecord>,
    pub stats: JiSegmentStats,
    pub skipped: Option<String>,
}

impl JiRfmOutcome {
    fn skipped(table: JiRecordBatch, reason: String) -> Self {
        log::warn!("rfm: segmentation skipped, {}", reason);
        Self {
            table,
            customers: Vec::new(),
            stats: JiSegmentStats::default(),
            skipped: Some(reason),
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }
}

/// Scores `values` into 1..=5 by quantile groups of their first-occurrence
/// ranks. With `inverse` the smallest value scores 5.
pub fn quantile_scores(values: &[f64], inverse: bool) -> Vec<u8> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..n).collect();
    // stable sort keeps list order among equal values
    order.sort_by(|a, b| values[*a].total_cmp(&values[*b]));
    let mut ranks = vec![0f64; n];
    for (position, index) in order.into_iter().enumerate() {
        ranks[index] = (position + 1) as f64;
    }

    let groups = SCORE_GROUPS as f64;
    let edges: Vec<f64> = (0..=SCORE_GROUPS)
        .map(|k| (groups + k as f64 * (n as f64 - 1.0)) / groups)
        .collect();
    let labels: Vec<String> = (1..=SCORE_GROUPS)
        .map(|score| {
            let score = if inverse { SCORE_GROUPS + 1 - score } else { score };
            score.to_string()
        })
        .collect();

    let lowest: u8 = if inverse { SCORE_GROUPS as u8 } else { 1 };
    match JiBinSpec::collapsed(&edges, &labels) {
        Some(spec) => ranks
            .iter()
            .map(|rank| {
                spec.assign(*rank)
                    .and_then(|label| label.parse::<u8>().ok())
                    .unwrap_or(lowest)
            })
            .collect(),
        None => vec![lowest; n],
    }
}

#[derive(Default)]
struct CustomerActivity {
    orders: HashSet<String>,
    monetary: f64,
    latest: Option<NaiveDateTime>,
}

/// Computes the RFM segmentation of a unified order table.
#[derive(Clone, Debug, Default)]
pub struct JiRfmSegmenter {
    resolver: JiColumnResolver,
    segment_column: Option<String>,
}

impl JiRfmSegmenter {
    #[allow(non_snake_case)]
    pub fn new(resolver: JiColumnResolver) -> Self {
        Self {
            resolver,
            segment_column: None,
        }
    }

    /// Overrides the name of the broadcast segment column.
    pub fn with_segment_column(mut self, column: impl Into<String>) -> Self {
        self.segment_column = Some(column.into());
        self
    }

    fn segment_column(&self) -> String {
        self.segment_column
            .clone()
            .unwrap_or_else(|| self.resolver.canonical(JiField::CustomerSegment).to_string())
    }

    pub fn segment(&self, batch: JiRecordBatch) -> JiRfmOutcome {
        if batch.is_empty() {
            return JiRfmOutcome::skipped(batch, "input table is empty".to_string());
        }

        let columns = JiColumnSet::from_batch(&batch);
        let mut missing = Vec::new();
        let customer = self.resolver.resolve(&columns, JiField::CustomerId);
        let order = self.resolver.resolve(&columns, JiField::OrderId);
        let purchase = self.resolver.resolve(&columns, JiField::PurchaseTimestamp);
        let monetary = self.resolver.resolve_first(&columns, &MONETARY_FALLBACK);
        for (field, resolved) in [
            (JiField::CustomerId, customer.is_some()),
            (JiField::OrderId, order.is_some()),
            (JiField::PurchaseTimestamp, purchase.is_some()),
        ] {
            if !resolved {
                missing.push(field.description().to_string());
            }
        }
        if monetary.is_none() {
            missing.push("monetary value".to_string());
        }
        let (Some(customer), Some(order), Some(purchase), Some((monetary_field, monetary))) =
            (customer, order, purchase, monetary)
        else {
            return JiRfmOutcome::skipped(batch, format!("missing columns: {}", missing.join(", ")));
        };
        log::info!(
            "rfm: monetary value from '{}' ({})",
            monetary,
            monetary_field.description()
        );

        let mut activity: BTreeMap<String, CustomerActivity> = BTreeMap::new();
        let mut reference: Option<NaiveDateTime> = None;
        for record in &batch {
            let purchased = record.get(purchase).and_then(parse_timestamp);
            if let Some(ts) = purchased {
                reference = Some(reference.map_or(ts, |current| current.max(ts)));
            }
            let Some(customer_id) = record.key(customer) else {
                continue;
            };
            let entry = activity.entry(customer_id).or_default();
            if let Some(order_id) = record.key(order) {
                entry.orders.insert(order_id);
            }
            entry.monetary += record.get(monetary).and_then(parse_number).unwrap_or(0.0);
            if let Some(ts) = purchased {
                entry.latest = Some(entry.latest.map_or(ts, |current| current.max(ts)));
            }
        }

        let Some(reference) = reference.map(|latest| latest + Duration::days(1)) else {
            return JiRfmOutcome::skipped(batch, "no valid purchase timestamp".to_string());
        };
        if activity.is_empty() {
            return JiRfmOutcome::skipped(batch, "no customer identifiers".to_string());
        }

        let customers = score_customers(activity, reference);
        let stats = JiSegmentStats::from_customers(&customers);
        log::info!(
            "rfm: {} customers segmented, reference date {}: {:?}",
            stats.total_customers,
            reference.format("%Y-%m-%d"),
            stats.customers_per_segment
        );

        let segments: HashMap<&str, JiSegment> = customers
            .iter()
            .map(|c| (c.customer_id.as_str(), c.segment))
            .collect();
        let segment_column = self.segment_column();
        let table = batch
            .into_iter()
            .map(|mut record| {
                let label = record
                    .key(customer)
                    .and_then(|id| segments.get(id.as_str()).copied())
                    .map(|segment| Value::String(segment.label().to_string()))
                    .unwrap_or(Value::Null);
                record.set(segment_column.clone(), label);
                record
            })
            .collect();

        JiRfmOutcome {
            table,
            customers,
            stats,
            skipped: None,
        }
    }
}

fn score_customers(
    activity: BTreeMap<String, CustomerActivity>,
    reference: NaiveDateTime,
) -> Vec<JiRfmRecord> {
    let recency: Vec<Option<i64>> = activity
        .values()
        .map(|a| a.latest.map(|latest| (reference - latest).num_days()))
        .collect();
    let frequency: Vec<f64> = activity.values().map(|a| a.orders.len() as f64).collect();
    let monetary: Vec<f64> = activity.values().map(|a| a.monetary).collect();

    let dated: Vec<usize> = (0..recency.len()).filter(|i| recency[*i].is_some()).collect();
    let dated_values: Vec<f64> = dated
        .iter()
        .filter_map(|i| recency[*i].map(|days| days as f64))
        .collect();
    let mut r_scores: Vec<Option<u8>> = vec![None; recency.len()];
    for (slot, score) in dated.iter().zip(quantile_scores(&dated_values, true)) {
        r_scores[*slot] = Some(score);
    }
    let f_scores = quantile_scores(&frequency, false);
    let m_scores = quantile_scores(&monetary, false);

    activity
        .into_iter()
        .enumerate()
        .map(|(i, (customer_id, a))| JiRfmRecord {
            customer_id,
            recency_days: recency[i],
            frequency: a.orders.len(),
            monetary: a.monetary,
            r_score: r_scores[i],
            f_score: f_scores[i],
            m_score: m_scores[i],
            segment: JiSegment::classify(f_scores[i], m_scores[i]),
        })
        .collect()
}
