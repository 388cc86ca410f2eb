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

use std::collections::HashMap;

use proptest::prelude::*;
use serde_json::{json, Value};
use jix::operators::{JiChildAggregator, JiDatasetUnifier};
use jix::outcome::JiStageOutcome;
use jix::record::JiRecord;
use jix::schema::{JiColumnResolver, JiField};

fn JiFTPayment(order: &str, seq: u32, kind: &str, installments: u32, value: f64) -> JiRecord {
    JiRecord::new(
        None,
        json!({
            "order_id": order,
            "payment_sequential": seq,
            "payment_type": kind,
            "payment_installments": installments,
            "payment_value": value,
        }),
    )
}

fn JiFTByKey(rows: &[JiRecord]) -> HashMap<String, Value> {
    rows.iter()
        .map(|row| (row.id.clone().unwrap_or_default(), row.payload.clone()))
        .collect()
}

#[test]
fn JiFTAggregatePaymentsOneRowPerOrder() {
    let payments = vec![
        JiFTPayment("o1", 1, "credit_card", 1, 10.0),
        JiFTPayment("o2", 1, "boleto", 1, 50.0),
        JiFTPayment("o1", 2, "voucher", 3, 5.5),
        JiFTPayment("o1", 3, "credit_card", 2, 16.0),
    ];
    let outcome = JiChildAggregator::payments().aggregate(&payments);
    let rows = outcome.into_batch().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id.as_deref(), Some("o1"));
    assert_eq!(rows[0].payload["id_ordine"], json!("o1"));
    assert_eq!(rows[0].payload["tipo_pagamento_principale"], json!("credit_card"));
    assert_eq!(rows[0].payload["valore_pagamento_totale"], json!(31.5));
    assert_eq!(rows[0].payload["massimo_rate"], json!(3));
    assert_eq!(rows[0].payload["numero_pagamenti"], json!(3));
    assert_eq!(rows[1].payload["valore_pagamento_totale"], json!(50));
}

#[test]
fn JiFTAggregateMissingColumnSkipsOnlyThatOutput() {
    let payments = vec![
        JiRecord::new(None, json!({"order_id": "o1", "payment_type": "boleto", "payment_value": 20.0})),
        JiRecord::new(None, json!({"order_id": "o1", "payment_type": "boleto", "payment_value": 5.0})),
    ];
    let rows = JiChildAggregator::payments()
        .aggregate(&payments)
        .into_batch()
        .unwrap();
    assert_eq!(rows.len(), 1);
    let row = rows[0].payload.as_object().unwrap();
    assert_eq!(row["valore_pagamento_totale"], json!(25));
    assert_eq!(row["tipo_pagamento_principale"], json!("boleto"));
    assert!(!row.contains_key("massimo_rate"));
    assert!(!row.contains_key("numero_pagamenti"));
}

#[test]
fn JiFTAggregateReportsUnavailableTables() {
    let empty = JiChildAggregator::reviews().aggregate(&[]);
    assert!(!empty.is_present());

    let no_key = vec![JiRecord::new(None, json!({"payment_value": 1.0}))];
    match JiChildAggregator::payments().aggregate(&no_key) {
        JiStageOutcome::Absent { stage, reason } => {
            assert_eq!(stage, "aggregate.payments");
            assert!(reason.contains("order identifier"));
        }
        JiStageOutcome::Present(_) => panic!("aggregate without order key"),
    }
}

#[test]
fn JiFTAggregatePaymentsWithoutValueColumnsIsAbsent() {
    let payments = vec![
        JiRecord::new(None, json!({"order_id": "o1", "note": "x"})),
        JiRecord::new(None, json!({"order_id": "o2", "note": "y"})),
    ];
    let outcome = JiChildAggregator::payments().aggregate(&payments);
    assert!(!outcome.is_present());
    assert!(outcome.is_empty());
    assert_eq!(outcome.reason(), Some("none of the aggregated columns is present"));
}

#[test]
fn JiFTAggregateUndefinedLabelForEmptyMode() {
    let payments = vec![JiRecord::new(None, json!({"order_id": "o1", "payment_type": null, "payment_value": 3}))];
    let rows = JiChildAggregator::payments()
        .with_undefined_label("sconosciuto")
        .aggregate(&payments)
        .into_batch()
        .unwrap();
    assert_eq!(rows[0].payload["tipo_pagamento_principale"], json!("sconosciuto"));
}

#[test]
fn JiFTUnifyLeftJoinKeepsEveryOrder() {
    let orders = vec![
        JiRecord::new(Some("0".to_string()), json!({"id_ordine": "o1", "id_cliente": "c1"})),
        JiRecord::new(Some("1".to_string()), json!({"id_ordine": "o2", "id_cliente": "c2"})),
        JiRecord::new(Some("2".to_string()), json!({"id_ordine": "o3", "id_cliente": "c1"})),
    ];
    let payments = vec![
        JiFTPayment("o1", 1, "credit_card", 2, 10.0),
        JiFTPayment("o4", 1, "boleto", 1, 99.0),
    ];
    let items = vec![
        JiRecord::new(None, json!({"order_id": "o3", "product_id": "p1", "price": 10.0, "freight_value": 2.0})),
        JiRecord::new(None, json!({"order_id": "o3", "product_id": "p2", "price": 5.0, "freight_value": 1.0})),
    ];
    let aggregates = vec![
        JiChildAggregator::payments().aggregate(&payments),
        JiChildAggregator::items().aggregate(&items),
        JiChildAggregator::reviews().aggregate(&[]),
    ];

    let unifier = JiDatasetUnifier::new(JiColumnResolver::new())
        .with_default(JiField::PrincipalPaymentType, json!("non_definito"));
    let unified = unifier.unify(&orders, &aggregates).unwrap();

    assert_eq!(unified.len(), 3);
    let ids: Vec<_> = unified.iter().map(|r| r.payload["id_ordine"].clone()).collect();
    assert_eq!(ids, vec![json!("o1"), json!("o2"), json!("o3")]);
    assert_eq!(unified[0].payload["valore_pagamento_totale"], json!(10));
    assert!(unified[1].payload["valore_pagamento_totale"].is_null());
    assert_eq!(unified[1].payload["tipo_pagamento_principale"], json!("non_definito"));
    assert_eq!(unified[2].payload["numero_articoli"], json!(2));
    assert_eq!(unified[2].payload["totale_prezzo"], json!(15));
    assert!(unified[0].payload["numero_articoli"].is_null());
    assert!(unified[0].payload.get("punteggio_medio_recensioni").is_none());
}

#[test]
fn JiFTUnifyFailsWithoutOrderKey() {
    let orders = vec![JiRecord::new(None, json!({"id_cliente": "c1"}))];
    let unifier = JiDatasetUnifier::new(JiColumnResolver::new());
    assert!(unifier.unify(&orders, &[]).is_err());
}

#[test]
fn JiFTUnifyJoinsFirstCustomerRow() {
    let orders = vec![
        JiRecord::new(None, json!({"id_ordine": "o1", "id_cliente": "c1"})),
        JiRecord::new(None, json!({"id_ordine": "o2", "id_cliente": "c9"})),
    ];
    let customers = vec![
        JiRecord::new(None, json!({"customer_id": "c1", "customer_city": "franca"})),
        JiRecord::new(None, json!({"customer_id": "c1", "customer_city": "campinas"})),
    ];
    let unifier = JiDatasetUnifier::new(JiColumnResolver::new());
    let joined = unifier.join_customers(orders, &customers);
    assert_eq!(joined.len(), 2);
    assert_eq!(joined[0].payload["customer_city"], json!("franca"));
    assert!(joined[1].payload["customer_city"].is_null());
}

fn JiFTPaymentRows() -> impl Strategy<Value = (Vec<(usize, u32, u32)>, Vec<(usize, u32, u32)>)> {
    prop::collection::vec((0usize..4, 0u32..1000, 1u32..12), 1..40)
        .prop_flat_map(|rows| (Just(rows.clone()), Just(rows).prop_shuffle()))
}

fn JiFTPaymentBatch(rows: &[(usize, u32, u32)]) -> Vec<JiRecord> {
    rows.iter()
        .map(|(order, value, installments)| {
            JiRecord::new(
                None,
                json!({
                    "order_id": format!("o{}", order),
                    "payment_value": value,
                    "payment_installments": installments,
                }),
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn JiFTAggregateIndependentOfRowOrder((rows, shuffled) in JiFTPaymentRows()) {
        let aggregator = JiChildAggregator::payments();
        let original = aggregator.aggregate(&JiFTPaymentBatch(&rows)).into_batch().unwrap();
        let permuted = aggregator.aggregate(&JiFTPaymentBatch(&shuffled)).into_batch().unwrap();

        prop_assert_eq!(original.len(), permuted.len());
        let original = JiFTByKey(&original);
        let permuted = JiFTByKey(&permuted);
        for (key, row) in &original {
            let other = &permuted[key];
            prop_assert_eq!(&row["valore_pagamento_totale"], &other["valore_pagamento_totale"]);
            prop_assert_eq!(&row["massimo_rate"], &other["massimo_rate"]);
        }

        let total: u64 = rows.iter().map(|(_, value, _)| u64::from(*value)).sum();
        let aggregated: i64 = original
            .values()
            .filter_map(|row| row["valore_pagamento_totale"].as_i64())
            .sum();
        prop_assert_eq!(total as i64, aggregated);
    }
}
