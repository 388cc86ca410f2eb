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

use std::fs;
use std::path::Path;

use serde_json::json;
use tempfile::tempdir;
use jix::config::JiConfig;
use jix::ingest::JiCsvReader;
use jix::operators::JiSegment;
use jix::outcome::JiStageOutcome;
use jix::pipeline::{JiSourceTables, JiUnificationPipeline};
use jix::record::JiRecord;

const ORDERS: &str = "\
order_id,customer_id,order_status,order_purchase_timestamp,order_approved_at,order_delivered_carrier_date,order_delivered_customer_date,order_estimated_delivery_date
o1,c1,delivered,2018-01-02 10:00:00,2018-01-02 11:00:00,2018-01-03 09:00:00,2018-01-06 12:00:00,2018-01-20 00:00:00
o2,c1,delivered,2018-01-20 10:00:00,2018-01-20 10:30:00,2018-01-22 09:00:00,2018-02-05 10:00:00,2018-02-01 00:00:00
o3,c2,canceled,2018-01-10 08:00:00,,,,2018-01-30 00:00:00
o3,c2,canceled,2018-01-10 08:00:00,,,,2018-01-30 00:00:00
";

const PAYMENTS: &str = "\
order_id,payment_sequential,payment_type,payment_installments,payment_value
o1,1,credit_card,3,80.00
o1,2,voucher,1,40.00
o2,1,boleto,1,350.00
o9,1,boleto,1,1.00
";

const ITEMS: &str = "\
order_id,order_item_id,product_id,seller_id,shipping_limit_date,price,freight_value
o1,1,p1,s1,2018-01-05 00:00:00,100.00,20.00
o2,1,p2,s1,2018-01-24 00:00:00,300.00,50.00
o3,1,p3,s2,2018-01-12 00:00:00,10.00,5.00
";

const CUSTOMERS: &str = "\
customer_id,customer_unique_id,customer_zip_code_prefix,customer_city,customer_state
c1,u1,01001,sao paulo,SP
c2,u2,20000,rio de janeiro,RJ
";

fn JiFTWriteSources(dir: &Path) {
    fs::write(dir.join("olist_orders_dataset.csv"), ORDERS).unwrap();
    fs::write(dir.join("olist_order_payments_dataset.csv"), PAYMENTS).unwrap();
    fs::write(dir.join("olist_order_items_dataset.csv"), ITEMS).unwrap();
    fs::write(dir.join("olist_customers_dataset.csv"), CUSTOMERS).unwrap();
}

fn JiFTConfig(data: &Path, outputs: &Path) -> JiConfig {
    JiConfig {
        data_dir: data.to_path_buf(),
        output_dir: outputs.to_path_buf(),
        ..JiConfig::default()
    }
}

#[test]
fn JiFTPipelineUnifiesAndSegmentsFromFiles() {
    let root = tempdir().unwrap();
    let data = root.path().join("data");
    let outputs = root.path().join("outputs");
    fs::create_dir_all(&data).unwrap();
    JiFTWriteSources(&data);

    let pipeline = JiUnificationPipeline::new(JiFTConfig(&data, &outputs)).unwrap();
    let output = pipeline.run_from_files().unwrap();

    let unified = &output.unified;
    assert_eq!(unified.len(), 3);
    let o1 = &unified[0].payload;
    assert_eq!(o1["id_ordine"], json!("o1"));
    assert_eq!(o1["stato_ordine"], json!("consegnato"));
    assert_eq!(o1["tipo_pagamento_principale"], json!("carta_di_credito"));
    assert_eq!(o1["valore_pagamento_totale"], json!(120));
    assert_eq!(o1["massimo_rate"], json!(3));
    assert_eq!(o1["numero_articoli"], json!(1));
    assert_eq!(o1["giorni_consegna"], json!(4));
    assert_eq!(o1["categoria_valore_ordine"], json!("medio"));
    assert_eq!(o1["categoria_velocita_consegna"], json!("rapida"));
    assert_eq!(o1["citta_cliente"], json!("sao paulo"));
    assert_eq!(o1["mese_acquisto"], json!("2018-01"));
    assert_eq!(o1["segmento_cliente"], json!("High Value"));

    let o2 = &unified[1].payload;
    assert_eq!(o2["categoria_valore_ordine"], json!("alto"));
    assert_eq!(o2["categoria_velocita_consegna"], json!("lenta"));
    assert_eq!(o2["differenza_giorni_stima"], json!(4));

    let o3 = &unified[2].payload;
    assert_eq!(o3["tipo_pagamento_principale"], json!("non_definito"));
    assert!(o3["valore_pagamento_totale"].is_null());
    assert!(o3["giorni_consegna"].is_null());
    assert!(o3["categoria_valore_ordine"].is_null());
    assert_eq!(o3["segmento_cliente"], json!("Low Value"));

    assert!(!output.rfm.is_skipped());
    assert_eq!(output.rfm.customers.len(), 2);
    assert_eq!(output.rfm.customers[0].segment, JiSegment::HighValue);
    assert_eq!(output.rfm.customers[1].recency_days, Some(11));

    assert!(output
        .unavailable
        .iter()
        .any(|(stage, _)| stage == "aggregate.reviews"));
    assert_eq!(output.summary.unique_orders, Some(3));
    assert_eq!(output.summary.unique_customers, Some(2));

    let reader = JiCsvReader::default();
    let written = reader
        .read_path(&outputs.join("olist_ordini_unificati.csv"))
        .into_batch()
        .unwrap();
    assert_eq!(written.len(), 3);
    assert_eq!(written[0].payload["segmento_cliente"], json!("High Value"));
    let customers = reader
        .read_path(&outputs.join("olist_segmentazione_clienti.csv"))
        .into_batch()
        .unwrap();
    assert_eq!(customers.len(), 2);
    assert_eq!(customers[1].payload["segment"], json!("Low Value"));
}

#[test]
fn JiFTPipelineFailsWithoutOrders() {
    let root = tempdir().unwrap();
    let pipeline =
        JiUnificationPipeline::new(JiFTConfig(root.path(), &root.path().join("outputs"))).unwrap();
    assert!(pipeline.run_from_files().is_err());
    assert!(!root.path().join("outputs").exists());
}

#[test]
fn JiFTPipelineOrdersOnlySkipsSegmentation() {
    let orders = vec![
        JiRecord::new(
            Some("0".to_string()),
            json!({"order_id": "o1", "customer_id": "c1", "order_status": "shipped",
                   "order_purchase_timestamp": "2018-05-01 09:00:00"}),
        ),
        JiRecord::new(
            Some("1".to_string()),
            json!({"order_id": "o2", "customer_id": "c2", "order_status": "invoiced",
                   "order_purchase_timestamp": "2018-05-03 09:00:00"}),
        ),
    ];
    let pipeline = JiUnificationPipeline::new(JiConfig::default()).unwrap();
    let output = pipeline.run(JiSourceTables::from_orders(orders)).unwrap();

    assert_eq!(output.unified.len(), 2);
    assert_eq!(output.unified[0].payload["stato_ordine"], json!("spedito"));
    assert_eq!(output.unified[1].payload["giorno_settimana_acquisto"], json!("Thursday"));
    assert!(output.unified[0].payload.get("tipo_pagamento_principale").is_none());
    assert!(output.rfm.is_skipped());
    assert!(output.unavailable.iter().any(|(stage, _)| stage == "rfm"));
    assert_eq!(output.unavailable.len(), 5);
}

#[test]
fn JiFTPipelineRejectsEmptyOrders() {
    let pipeline = JiUnificationPipeline::new(JiConfig::default()).unwrap();
    assert!(pipeline.run(JiSourceTables::from_orders(Vec::new())).is_err());
}

#[test]
fn JiFTPipelineConfigFromYaml() {
    let root = tempdir().unwrap();
    let path = root.path().join("ji.yaml");
    fs::write(
        &path,
        "conversion_rate: 0.2\nsegment_column: segmento\nwrite:\n  delimiter: ';'\n  encoding: latin-1\nbinning:\n  - field: delivery_days\n    output: consegna\n    spec:\n      edges: [0, 10, inf]\n      labels: [veloce, lenta]\n",
    )
    .unwrap();
    let config = JiConfig::from_path(&path).unwrap();
    assert_eq!(config.conversion_rate, 0.2);
    assert_eq!(config.write.delimiter, ';');
    assert_eq!(config.binning.len(), 1);
    assert_eq!(config.binning[0].spec.edges()[2], f64::INFINITY);
    assert_eq!(config.output_file, "olist_ordini_unificati.csv");

    fs::write(&path, "conversion_rate: -1\n").unwrap();
    assert!(JiConfig::from_path(&path).is_err());
}

#[test]
fn JiFTPipelineTranslatesCategoriesOnCallerTables() {
    let orders = vec![JiRecord::new(
        Some("0".to_string()),
        json!({"order_id": "o1", "customer_id": "c1",
               "order_purchase_timestamp": "2018-05-01 09:00:00",
               "product_category_name": "beleza_saude"}),
    )];
    let categories = vec![
        JiRecord::new(None, json!({"product_category_name": "beleza_saude",
                                   "product_category_name_english": "health_beauty"})),
    ];
    let mut sources = JiSourceTables::from_orders(orders);
    sources.product_category = JiStageOutcome::Present(categories);

    let pipeline = JiUnificationPipeline::new(JiConfig::default()).unwrap();
    let output = pipeline.run(sources).unwrap();
    assert_eq!(output.unified[0].payload["product_category_name"], json!("health_beauty"));
}
