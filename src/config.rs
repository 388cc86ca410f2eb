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

//! # Ji Configuration Module
//!
//! [`JiConfig`] gathers everything the pipeline needs that is not data:
//! file locations, CSV dialects, translation dictionaries, binning rules,
//! the currency conversion rate and resolver overrides. Every field has a
//! default reproducing the Olist setup with Italian column names, so a
//! configuration file only lists what it changes.
//!
//! ## Loading
//!
//! ```rust
//! use jix::config::JiConfig;
//!
//! let config: JiConfig = serde_json::from_str(r#"{"conversion_rate": 0.25}"#).unwrap();
//! assert_eq!(config.undefined_label, "non_definito");
//! config.validate().unwrap();
//! ```
//!
//! [`JiConfig::from_path`] picks JSON or YAML from the file extension. Bin
//! edges may be written as `"inf"` / `"-inf"`.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::errors::{JiError, Result};
use crate::operators::aggregate::UNDEFINED_LABEL;
use crate::operators::binning::JiBinSpec;
use crate::operators::currency::DEFAULT_CONVERSION_RATE;
use crate::schema::{JiColumnResolver, JiField, JiValueMaps};

/// Character encoding of a CSV file, named by label.
///
/// Any WHATWG encoding label is accepted (`utf-8`, `latin-1`,
/// `windows-1252`, `utf-16le`, ...). Note that `latin-1` and `iso-8859-1`
/// resolve to windows-1252.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JiEncoding(String);

impl Default for JiEncoding {
    fn default() -> Self {
        Self::utf8()
    }
}

impl JiEncoding {
    #[allow(non_snake_case)]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn utf8() -> Self {
        Self::new("utf-8")
    }

    pub fn latin1() -> Self {
        Self::new("latin-1")
    }

    pub fn label(&self) -> &str {
        &self.0
    }

    /// Looks the label up in the encoding registry.
    pub fn resolve(&self) -> Result<&'static Encoding> {
        Encoding::for_label(self.0.trim().as_bytes())
            .ok_or_else(|| JiError::validation(format!("unknown encoding label '{}'", self.0)))
    }
}

/// CSV dialect used for reading or writing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JiCsvOptions {
    pub delimiter: char,
    pub encoding: JiEncoding,
    pub has_headers: bool,
}

impl Default for JiCsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            encoding: JiEncoding::utf8(),
            has_headers: true,
        }
    }
}

impl JiCsvOptions {
    /// Delimiter as the single byte the CSV codec expects.
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(JiError::validation(format!(
                "csv delimiter '{}' must be an ASCII character",
                self.delimiter
            )))
        }
    }
}

/// File names of the input tables, relative to `data_dir`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JiDatasetFiles {
    pub orders: String,
    pub order_items: String,
    pub order_payments: String,
    pub order_reviews: String,
    pub customers: String,
    pub product_category: String,
}

impl Default for JiDatasetFiles {
    fn default() -> Self {
        Self {
            orders: "olist_orders_dataset.csv".into(),
            order_items: "olist_order_items_dataset.csv".into(),
            order_payments: "olist_order_payments_dataset.csv".into(),
            order_reviews: "olist_order_reviews_dataset.csv".into(),
            customers: "olist_customers_dataset.csv".into(),
            product_category: "product_category_name_translation.csv".into(),
        }
    }
}

/// A binning applied to the unified table.
///
/// The input is either a logical `field`, resolved like any other column,
/// or a literal `column` name. `field` wins when both are set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JiBinningRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<JiField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub output: String,
    pub spec: JiBinSpec,
}

/// Columns of the product category translation table.
///
/// The resulting dictionary remaps `key_column` wherever a table carries
/// it. None of the standard Olist tables loaded by the pipeline has that
/// column, so it only takes effect on tables supplied by the caller that do,
/// such as an orders table joined with products beforehand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JiCategoryTranslation {
    pub key_column: String,
    pub value_column: String,
}

impl Default for JiCategoryTranslation {
    fn default() -> Self {
        Self {
            key_column: "product_category_name".into(),
            value_column: "product_category_name_english".into(),
        }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JiConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub files: JiDatasetFiles,
    pub output_file: String,
    pub customers_output_file: String,
    pub read: JiCsvOptions,
    pub write: JiCsvOptions,
    /// Source column name to translated name.
    pub column_translation: BTreeMap<String, String>,
    /// Value dictionaries keyed by source column name.
    pub value_translation: JiValueMaps,
    pub category_translation: JiCategoryTranslation,
    pub binning: Vec<JiBinningRule>,
    pub conversion_rate: f64,
    pub undefined_label: String,
    pub segment_column: String,
    /// Replaces the built-in candidate list of individual fields.
    pub column_candidates: BTreeMap<JiField, Vec<String>>,
}

fn pairs(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn default_column_translation() -> BTreeMap<String, String> {
    pairs(&[
        ("order_id", "id_ordine"),
        ("customer_id", "id_cliente"),
        ("order_status", "stato_ordine"),
        ("order_purchase_timestamp", "data_acquisto"),
        ("order_approved_at", "data_approvazione"),
        ("order_delivered_carrier_date", "data_spedizione"),
        ("order_delivered_customer_date", "data_consegna"),
        ("order_estimated_delivery_date", "data_consegna_stimata"),
        ("customer_unique_id", "id_cliente_univoco"),
        ("customer_zip_code_prefix", "cap_cliente"),
        ("customer_city", "citta_cliente"),
        ("customer_state", "stato_cliente"),
        ("order_item_id", "id_articolo_ordine"),
        ("product_id", "id_prodotto"),
        ("seller_id", "id_venditore"),
        ("shipping_limit_date", "data_limite_spedizione"),
        ("price", "prezzo"),
        ("freight_value", "costo_spedizione"),
        ("payment_sequential", "sequenza_pagamento"),
        ("payment_type", "tipo_pagamento"),
        ("payment_installments", "rate_pagamento"),
        ("payment_value", "valore_pagamento"),
        ("review_id", "id_recensione"),
        ("review_score", "punteggio_recensione"),
        ("review_comment_title", "titolo_recensione"),
        ("review_comment_message", "testo_recensione"),
        ("review_creation_date", "data_creazione_recensione"),
        ("review_answer_timestamp", "data_risposta_recensione"),
    ])
}

fn default_value_translation() -> JiValueMaps {
    let mut maps = JiValueMaps::new();
    maps.insert(
        "order_status".into(),
        pairs(&[
            ("delivered", "consegnato"),
            ("shipped", "spedito"),
            ("canceled", "cancellato"),
            ("unavailable", "non_disponibile"),
            ("processing", "in_elaborazione"),
            ("created", "creato"),
            ("approved", "approvato"),
            ("invoiced", "fatturato"),
        ]),
    );
    maps.insert(
        "payment_type".into(),
        pairs(&[
            ("credit_card", "carta_di_credito"),
            ("boleto", "boleto"),
            ("voucher", "voucher"),
            ("debit_card", "carta_di_debito"),
            ("not_defined", "non_definito"),
        ]),
    );
    maps
}

fn tier(edges: &[f64], labels: &[&str]) -> Option<JiBinSpec> {
    JiBinSpec::new(edges.to_vec(), labels.iter().map(|l| l.to_string()).collect()).ok()
}

fn default_binning() -> Vec<JiBinningRule> {
    let mut rules = Vec::new();
    // thresholds are in BRL
    if let Some(spec) = tier(
        &[0.0, 100.0, 300.0, 1000.0, f64::INFINITY],
        &["basso", "medio", "alto", "molto_alto"],
    ) {
        rules.push(JiBinningRule {
            field: Some(JiField::PaymentTotal),
            column: None,
            output: "categoria_valore_ordine".into(),
            spec,
        });
    }
    if let Some(spec) = tier(
        &[0.0, 3.0, 7.0, 14.0, f64::INFINITY],
        &["molto_rapida", "rapida", "normale", "lenta"],
    ) {
        rules.push(JiBinningRule {
            field: Some(JiField::DeliveryDays),
            column: None,
            output: "categoria_velocita_consegna".into(),
            spec,
        });
    }
    rules
}

impl Default for JiConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("outputs"),
            files: JiDatasetFiles::default(),
            output_file: "olist_ordini_unificati.csv".into(),
            customers_output_file: "olist_segmentazione_clienti.csv".into(),
            read: JiCsvOptions::default(),
            write: JiCsvOptions::default(),
            column_translation: default_column_translation(),
            value_translation: default_value_translation(),
            category_translation: JiCategoryTranslation::default(),
            binning: default_binning(),
            conversion_rate: DEFAULT_CONVERSION_RATE,
            undefined_label: UNDEFINED_LABEL.into(),
            segment_column: "segmento_cliente".into(),
            column_candidates: BTreeMap::new(),
        }
    }
}

impl JiConfig {
    /// Loads a configuration file; `.yaml` / `.yml` are read as YAML,
    /// anything else as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);
        let config: JiConfig = if yaml {
            serde_yaml::from_str(&text)?
        } else {
            serde_json::from_str(&text)?
        };
        config.validate()?;
        log::info!("config loaded from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.conversion_rate.is_finite() || self.conversion_rate <= 0.0 {
            return Err(JiError::validation(format!(
                "conversion_rate must be a positive number, got {}",
                self.conversion_rate
            )));
        }
        if self.undefined_label.trim().is_empty() {
            return Err(JiError::validation("undefined_label must not be empty"));
        }
        if self.segment_column.trim().is_empty() {
            return Err(JiError::validation("segment_column must not be empty"));
        }
        for rule in &self.binning {
            if rule.field.is_none() && rule.column.is_none() {
                return Err(JiError::validation(format!(
                    "binning rule '{}' needs a field or a column",
                    rule.output
                )));
            }
            if rule.output.trim().is_empty() {
                return Err(JiError::validation("binning rule output must not be empty"));
            }
        }
        self.read.delimiter_byte()?;
        self.write.delimiter_byte()?;
        self.read.encoding.resolve()?;
        self.write.encoding.resolve()?;
        self.resolver().map(|_| ())
    }

    /// Column resolver with the configured candidate overrides.
    pub fn resolver(&self) -> Result<JiColumnResolver> {
        let overrides: HashMap<JiField, Vec<String>> = self
            .column_candidates
            .iter()
            .map(|(field, names)| (*field, names.clone()))
            .collect();
        JiColumnResolver::from_overrides(&overrides)
    }

    pub fn input_path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    pub fn output_path(&self, file: &str) -> PathBuf {
        self.output_dir.join(file)
    }
}
