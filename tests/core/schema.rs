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

use std::collections::{BTreeMap, HashMap};

use serde_json::json;
use jix::operator::JiOperator;
use jix::record::JiRecord;
use jix::schema::{
    parse_number, parse_timestamp, value_map_from_table, JiCoerce, JiColumnResolver, JiColumnSet,
    JiField, JiTranslate, JiValueMaps,
};

fn JiFTOrderTranslator() -> JiTranslate {
    let columns = HashMap::from([
        ("order_id".to_string(), "id_ordine".to_string()),
        ("customer_id".to_string(), "id_cliente".to_string()),
        ("order_status".to_string(), "stato_ordine".to_string()),
        ("order_purchase_timestamp".to_string(), "data_acquisto".to_string()),
    ]);
    let mut values = JiValueMaps::new();
    values.insert(
        "order_status".into(),
        BTreeMap::from([
            ("delivered".to_string(), "consegnato".to_string()),
            ("canceled".to_string(), "annullato".to_string()),
        ]),
    );
    JiTranslate::new(columns, values)
}

#[test]
fn JiFTSchemaResolvesEitherNaming() {
    let resolver = JiColumnResolver::new();
    let source = JiColumnSet::from_names(["order_id", "customer_id", "order_purchase_timestamp"]);
    let translated = JiColumnSet::from_names(["id_ordine", "id_cliente", "data_acquisto"]);

    for field in [JiField::OrderId, JiField::CustomerId, JiField::PurchaseTimestamp] {
        assert!(resolver.resolve(&source, field).is_some());
        assert!(resolver.resolve(&translated, field).is_some());
    }
    assert_eq!(resolver.resolve(&source, JiField::OrderId), Some("order_id"));
    assert_eq!(resolver.resolve(&translated, JiField::OrderId), Some("id_ordine"));
    assert_eq!(resolver.resolve(&source, JiField::PaymentValue), None);
}

#[test]
fn JiFTSchemaResolveFirstWalksFallbackChain() {
    let resolver = JiColumnResolver::new();
    let columns = JiColumnSet::from_names(["id_cliente", "valore_pagamento_totale"]);
    let resolved = resolver.resolve_first(
        &columns,
        &[JiField::OrderTotalEur, JiField::PaymentTotalEur, JiField::PaymentTotal],
    );
    assert_eq!(resolved, Some((JiField::PaymentTotal, "valore_pagamento_totale")));
}

#[test]
fn JiFTSchemaOverridesFromConfiguration() {
    let overrides = HashMap::from([(JiField::CustomerId, vec!["cliente".to_string()])]);
    let resolver = JiColumnResolver::from_overrides(&overrides).unwrap();
    let columns = JiColumnSet::from_names(["id_cliente", "cliente"]);
    assert_eq!(resolver.resolve(&columns, JiField::CustomerId), Some("cliente"));
    assert_eq!(resolver.candidates(JiField::OrderId), vec!["id_ordine", "order_id"]);
}

#[test]
fn JiFTSchemaTranslateIsIdempotent() {
    let batch = vec![
        JiRecord::new(
            Some("0".to_string()),
            json!({"order_id": "o1", "customer_id": "c1", "order_status": "delivered"}),
        ),
        JiRecord::new(
            Some("1".to_string()),
            json!({"order_id": "o2", "customer_id": "c2", "order_status": "unavailable"}),
        ),
    ];
    let translator = JiFTOrderTranslator();
    let once = translator.apply(batch).unwrap();
    let twice = translator.apply(once.clone()).unwrap();
    assert_eq!(once, twice);

    assert_eq!(
        once[0].payload,
        json!({"id_ordine": "o1", "id_cliente": "c1", "stato_ordine": "consegnato"})
    );
    // unmapped values are kept
    assert_eq!(once[1].payload["stato_ordine"], json!("unavailable"));
}

#[test]
fn JiFTSchemaTranslateRemapsAlreadyTranslatedColumn() {
    let batch = vec![JiRecord::new(None, json!({"id_ordine": "o1", "stato_ordine": "canceled"}))];
    let out = JiFTOrderTranslator().apply(batch).unwrap();
    assert_eq!(out[0].payload["stato_ordine"], json!("annullato"));
}

#[test]
fn JiFTSchemaTranslateSkipsAbsentColumns() {
    let batch = vec![JiRecord::new(None, json!({"review_id": "r1", "review_score": 4}))];
    let out = JiFTOrderTranslator().apply(batch.clone()).unwrap();
    assert_eq!(out, batch);
}

#[test]
fn JiFTSchemaCategoryDictionaryFromTable() {
    let table = vec![
        JiRecord::new(None, json!({"product_category_name": "beleza_saude", "product_category_name_english": "health_beauty"})),
        JiRecord::new(None, json!({"product_category_name": "pet_shop", "product_category_name_english": null})),
    ];
    let mapping = value_map_from_table(&table, "product_category_name", "product_category_name_english");
    assert_eq!(mapping.len(), 1);
    assert_eq!(mapping["beleza_saude"], "health_beauty");
}

#[test]
fn JiFTSchemaCoerceNullsMalformedCells() {
    let resolver = JiColumnResolver::new();
    let coerce = JiCoerce::from_fields(
        &resolver,
        &[JiField::PurchaseTimestamp],
        &[JiField::PaymentValue],
    );
    let batch = vec![
        JiRecord::new(None, json!({"data_acquisto": "2017-10-02T10:56:33", "payment_value": "18.12"})),
        JiRecord::new(None, json!({"data_acquisto": "yesterday", "payment_value": "n/a"})),
    ];
    let out = coerce.apply(batch).unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].payload["data_acquisto"], json!("2017-10-02 10:56:33"));
    assert_eq!(parse_number(&out[0].payload["payment_value"]), Some(18.12));
    assert!(out[1].payload["data_acquisto"].is_null());
    assert!(out[1].payload["payment_value"].is_null());
    assert!(parse_timestamp(&out[0].payload["data_acquisto"]).is_some());
}
