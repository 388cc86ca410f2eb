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

#![allow(non_snake_case)]

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use serde_json::json;
use jix::operators::{quantile_scores, JiRfmSegmenter, JiSegment};
use jix::record::{JiRecord, JiRecordBatch};
use jix::schema::JiColumnResolver;

fn JiFTOrder(order: &str, customer: Option<&str>, purchased: &str, total: f64) -> JiRecord {
    JiRecord::new(
        Some(order.to_string()),
        json!({
            "id_ordine": order,
            "id_cliente": customer,
            "data_acquisto": purchased,
            "valore_pagamento_totale": total,
        }),
    )
}

fn JiFTTwoCustomers() -> JiRecordBatch {
    vec![
        JiFTOrder("o1", Some("C1"), "2018-01-01 10:00:00", 50.0),
        JiFTOrder("o2", Some("C2"), "2018-01-05 10:00:00", 10.0),
        JiFTOrder("o3", Some("C1"), "2018-01-10 10:00:00", 100.0),
        JiFTOrder("o4", Some("C1"), "2018-01-20 10:00:00", 150.0),
    ]
}

#[test]
fn JiFTRfmTwoCustomerScenario() {
    let outcome = JiRfmSegmenter::new(JiColumnResolver::new()).segment(JiFTTwoCustomers());
    assert!(!outcome.is_skipped());
    assert_eq!(outcome.customers.len(), 2);

    let c1 = &outcome.customers[0];
    assert_eq!(c1.customer_id, "C1");
    assert_eq!(c1.recency_days, Some(1));
    assert_eq!(c1.frequency, 3);
    assert_eq!(c1.monetary, 300.0);
    assert_eq!((c1.r_score, c1.f_score, c1.m_score), (Some(5), 5, 5));
    assert_eq!(c1.segment, JiSegment::HighValue);

    let c2 = &outcome.customers[1];
    assert_eq!(c2.customer_id, "C2");
    assert_eq!(c2.recency_days, Some(16));
    assert_eq!(c2.frequency, 1);
    assert_eq!(c2.monetary, 10.0);
    assert_eq!((c2.r_score, c2.f_score, c2.m_score), (Some(1), 1, 1));
    assert_eq!(c2.segment, JiSegment::LowValue);

    let segments: Vec<_> = outcome
        .table
        .iter()
        .map(|r| r.payload["segmento_cliente"].clone())
        .collect();
    assert_eq!(
        segments,
        vec![json!("High Value"), json!("Low Value"), json!("High Value"), json!("High Value")]
    );
    assert_eq!(outcome.stats.total_customers, 2);
    assert_eq!(outcome.stats.customers_per_segment["High Value"], 1);
}

#[test]
fn JiFTRfmFrequentButCheapCustomer() {
    assert_eq!(JiSegment::classify(5, 2), JiSegment::MediumLowValue);
    assert_eq!(JiSegment::classify(5, 2).to_string(), "Medium-Low Value");

    let batch = vec![
        JiFTOrder("o1", Some("A"), "2018-03-01 00:00:00", 2.0),
        JiFTOrder("o2", Some("A"), "2018-03-02 00:00:00", 3.0),
        JiFTOrder("o3", Some("B"), "2018-03-03 00:00:00", 100.0),
    ];
    let outcome = JiRfmSegmenter::new(JiColumnResolver::new()).segment(batch);
    let a = &outcome.customers[0];
    assert_eq!((a.f_score, a.m_score), (5, 1));
    assert_eq!(a.segment, JiSegment::MediumLowValue);
    assert_eq!(outcome.customers[1].segment, JiSegment::MediumLowValue);
}

#[test]
fn JiFTRfmCustomSegmentColumnAndNullCustomer() {
    let mut batch = JiFTTwoCustomers();
    batch.push(JiFTOrder("o5", None, "2018-01-05 00:00:00", 7.0));
    let outcome = JiRfmSegmenter::new(JiColumnResolver::new())
        .with_segment_column("segment")
        .segment(batch);
    assert_eq!(outcome.table.len(), 5);
    assert!(outcome.table[4].payload["segment"].is_null());
    assert_eq!(outcome.table[0].payload["segment"], json!("High Value"));
    assert!(outcome.table[0].payload.get("segmento_cliente").is_none());
}

#[test]
fn JiFTRfmSkipsWithoutTimestamps() {
    let batch = vec![
        JiFTOrder("o1", Some("A"), "", 2.0),
        JiFTOrder("o2", Some("B"), "not a date", 3.0),
    ];
    let outcome = JiRfmSegmenter::new(JiColumnResolver::new()).segment(batch.clone());
    assert!(outcome.is_skipped());
    assert_eq!(outcome.table, batch);
    assert!(outcome.customers.is_empty());
}

#[test]
fn JiFTRfmQuantileScoresSpreadEvenly() {
    let values: Vec<f64> = (1..=10).map(f64::from).collect();
    assert_eq!(quantile_scores(&values, false), vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 5]);
    assert_eq!(quantile_scores(&values, true), vec![5, 5, 4, 4, 3, 3, 2, 2, 1, 1]);
}

proptest! {
    #[test]
    fn JiFTRfmEveryCustomerSegmented(
        rows in prop::collection::vec((0usize..8, 1u32..29, 1u32..500), 1..60)
    ) {
        let batch: JiRecordBatch = rows
            .iter()
            .enumerate()
            .map(|(i, (customer, day, total))| {
                JiRecord::new(
                    Some(i.to_string()),
                    json!({
                        "id_ordine": format!("o{}", i),
                        "id_cliente": format!("c{}", customer),
                        "data_acquisto": format!("2018-02-{:02} 12:00:00", day),
                        "valore_pagamento_totale": total,
                    }),
                )
            })
            .collect();
        let distinct: HashSet<_> = rows.iter().map(|(customer, _, _)| *customer).collect();

        let outcome = JiRfmSegmenter::new(JiColumnResolver::new()).segment(batch);
        prop_assert!(!outcome.is_skipped());
        prop_assert_eq!(outcome.customers.len(), distinct.len());
        prop_assert_eq!(outcome.stats.total_customers, distinct.len());
        prop_assert_eq!(outcome.table.len(), rows.len());
        let by_customer: HashMap<&str, &str> = outcome
            .customers
            .iter()
            .map(|customer| (customer.customer_id.as_str(), customer.segment.label()))
            .collect();
        for record in &outcome.table {
            let customer = record.payload["id_cliente"].as_str().unwrap();
            prop_assert_eq!(
                record.payload["segmento_cliente"].as_str(),
                Some(by_customer[customer])
            );
        }
        for customer in &outcome.customers {
            prop_assert!((1..=5).contains(&customer.f_score));
            prop_assert!((1..=5).contains(&customer.m_score));
            prop_assert!(customer.recency_days.map_or(false, |days| days >= 1));
            prop_assert!(customer.r_score.is_some());
        }
    }
}
