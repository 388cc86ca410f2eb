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

use serde_json::Value;

use crate::errors::{JiError, Result};
use crate::operator::JiOperator;
use crate::record::JiRecordBatch;
use crate::schema::{number_value, parse_number, JiColumnResolver, JiColumnSet, JiField};

/// Default BRL to EUR rate.
pub const DEFAULT_CONVERSION_RATE: f64 = 0.278;

/// Native-currency fields and the converted field each one produces.
pub const CONVERTED_FIELDS: [(JiField, JiField); 3] = [
    (JiField::Price, JiField::PriceEur),
    (JiField::Freight, JiField::FreightEur),
    (JiField::PaymentValue, JiField::PaymentValueEur),
];

/// Adds converted-currency columns as `native * rate`.
///
/// Only fields present in the table are converted; null or malformed native
/// values stay null.
#[derive(Debug, Clone)]
pub struct JiCurrencyConvert {
    rate: f64,
    resolver: JiColumnResolver,
}

impl JiCurrencyConvert {
    #[allow(non_snake_case)]
    pub fn new(rate: f64, resolver: JiColumnResolver) -> Result<Self> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(JiError::validation(format!(
                "conversion rate must be a positive number, got {}",
                rate
            )));
        }
        Ok(Self { rate, resolver })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl JiOperator for JiCurrencyConvert {
    fn name(&self) -> &'static str {
        "currency.convert"
    }

    fn apply(&self, mut batch: JiRecordBatch) -> Result<JiRecordBatch> {
        let columns = JiColumnSet::from_batch(&batch);
        let plan: Vec<(String, String)> = CONVERTED_FIELDS
            .iter()
            .filter_map(|(native, converted)| {
                self.resolver.resolve(&columns, *native).map(|source| {
                    (
                        source.to_string(),
                        self.resolver.canonical(*converted).to_string(),
                    )
                })
            })
            .collect();

        for record in batch.iter_mut() {
            for (source, target) in &plan {
                let converted = record
                    .get(source)
                    .and_then(parse_number)
                    .map(|n| number_value(n * self.rate))
                    .unwrap_or(Value::Null);
                record.set(target.as_str(), converted);
            }
        }

        if !plan.is_empty() {
            log::info!(
                "{}: {} columns converted at rate {}",
                self.name(),
                plan.len(),
                self.rate
            );
        }
        Ok(batch)
    }
}
