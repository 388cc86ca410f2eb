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

//! # Unification Pipeline
//!
//! [`JiUnificationPipeline`] sequences every stage from one [`JiConfig`]:
//!
//! 1. per table: quality report, translation, type coercion, duplicate removal
//! 2. orders: temporal features; items and payments: currency conversion
//! 3. child aggregation of payments, items and reviews
//! 4. left joins onto orders, then customer attributes
//! 5. configured binnings and the RFM segmentation
//!
//! Missing tables degrade the output; only a missing orders table fails.

use std::collections::HashMap;

use serde_json::Value;

use crate::config::JiConfig;
use crate::errors::{JiError, Result};
use crate::inspect::{JiDatasetSummary, JiQualityReport};
use crate::operator::{execute_operator, JiOperator};
use crate::operators::{
    JiBinner, JiChildAggregator, JiCurrencyConvert, JiDatasetUnifier, JiDeduplicate, JiRfmOutcome,
    JiRfmSegmenter, JiTemporalFeatures,
};
use crate::outcome::JiStageOutcome;
use crate::record::JiRecordBatch;
use crate::schema::{value_map_from_table, JiCoerce, JiColumnResolver, JiColumnSet, JiField, JiTranslate};

/// The raw input tables, each possibly absent.
#[derive(Clone, Debug)]
pub struct JiSourceTables {
    pub orders: JiStageOutcome,
    pub order_items: JiStageOutcome,
    pub order_payments: JiStageOutcome,
    pub order_reviews: JiStageOutcome,
    pub customers: JiStageOutcome,
    pub product_category: JiStageOutcome,
}

impl JiSourceTables {
    /// Only an orders table; every other source absent.
    #[allow(non_snake_case)]
    pub fn from_orders(orders: JiRecordBatch) -> Self {
        let absent = |name: &str| JiStageOutcome::absent(format!("load.{}", name), "not provided");
        Self {
            orders: JiStageOutcome::Present(orders),
            order_items: absent("order_items"),
            order_payments: absent("order_payments"),
            order_reviews: absent("order_reviews"),
            customers: absent("customers"),
            product_category: absent("product_category"),
        }
    }
}

/// Everything a pipeline run produces.
#[derive(Clone, Debug)]
pub struct JiPipelineOutput {
    /// One row per order with aggregates, features, bins and segment.
    pub unified: JiRecordBatch,
    pub rfm: JiRfmOutcome,
    pub quality: Vec<JiQualityReport>,
    pub summary: JiDatasetSummary,
    /// Stages that produced nothing, with their reasons.
    pub unavailable: Vec<(String, String)>,
}

/// Table to table flow from raw sources to the segmented order table.
#[derive(Clone, Debug)]
pub struct JiUnificationPipeline {
    config: JiConfig,
    resolver: JiColumnResolver,
}

impl JiUnificationPipeline {
    #[allow(non_snake_case)]
    pub fn new(config: JiConfig) -> Result<Self> {
        config.validate()?;
        let resolver = config.resolver()?;
        Ok(Self { config, resolver })
    }

    pub fn config(&self) -> &JiConfig {
        &self.config
    }

    /// Runs every stage over in-memory tables.
    pub fn run(&self, sources: JiSourceTables) -> Result<JiPipelineOutput> {
        let mut unavailable = Vec::new();
        let mut quality = Vec::new();

        let translator = self.translator(&sources.product_category);

        let orders = match sources.orders {
            JiStageOutcome::Present(batch) if !batch.is_empty() => batch,
            JiStageOutcome::Present(_) => {
                return Err(JiError::pipeline("load.orders", "orders table is empty"))
            }
            JiStageOutcome::Absent { reason, .. } => {
                return Err(JiError::pipeline("load.orders", reason))
            }
        };

        let orders = self.prepare("orders", orders, &translator, &mut quality)?;
        let orders = execute_operator(&JiTemporalFeatures::new(self.resolver.clone()), orders)?;

        let converter = JiCurrencyConvert::new(self.config.conversion_rate, self.resolver.clone())?;
        let items = self.prepare_optional("order_items", sources.order_items, &translator, &mut quality, Some(&converter))?;
        let payments =
            self.prepare_optional("order_payments", sources.order_payments, &translator, &mut quality, Some(&converter))?;
        let reviews = self.prepare_optional("order_reviews", sources.order_reviews, &translator, &mut quality, None)?;
        let customers = self.prepare_optional("customers", sources.customers, &translator, &mut quality, None)?;

        let aggregates = self.aggregate(&payments, &items, &reviews);
        for outcome in aggregates.iter() {
            if let JiStageOutcome::Absent { stage, reason } = outcome {
                unavailable.push((stage.clone(), reason.clone()));
            }
        }

        let unifier = JiDatasetUnifier::new(self.resolver.clone()).with_default(
            JiField::PrincipalPaymentType,
            Value::String(self.config.undefined_label.clone()),
        );
        let mut unified = unifier.unify(&orders, &aggregates)?;
        match customers {
            JiStageOutcome::Present(customers) => {
                unified = unifier.join_customers(unified, &customers);
            }
            JiStageOutcome::Absent { stage, reason } => unavailable.push((stage, reason)),
        }

        unified = self.apply_binning(unified)?;

        let segmenter = JiRfmSegmenter::new(self.resolver.clone())
            .with_segment_column(self.config.segment_column.clone());
        let rfm = segmenter.segment(unified);
        if let Some(reason) = &rfm.skipped {
            unavailable.push(("rfm".to_string(), reason.clone()));
        }
        let unified = rfm.table.clone();

        let summary = JiDatasetSummary::from_batch(&unified, &self.resolver);
        summary.log();

        Ok(JiPipelineOutput {
            unified,
            rfm,
            quality,
            summary,
            unavailable,
        })
    }

    fn translator(&self, categories: &JiStageOutcome) -> JiTranslate {
        let columns: HashMap<String, String> = self
            .config
            .column_translation
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let mut values = self.config.value_translation.clone();
        if let Some(batch) = categories.batch() {
            let mapping = value_map_from_table(
                batch,
                &self.config.category_translation.key_column,
                &self.config.category_translation.value_column,
            );
            log::info!("{} product category translations loaded", mapping.len());
            values
                .entry(self.config.category_translation.key_column.clone())
                .or_default()
                .extend(mapping);
        }
        JiTranslate::new(columns, values)
    }

    /// Quality report, translation, coercion and duplicate removal.
    fn prepare(
        &self,
        name: &str,
        batch: JiRecordBatch,
        translator: &JiTranslate,
        quality: &mut Vec<JiQualityReport>,
    ) -> Result<JiRecordBatch> {
        let report = JiQualityReport::from_batch(name, &batch);
        report.log();
        quality.push(report);

        let coerce = JiCoerce::from_fields(&self.resolver, &date_fields(name), &numeric_fields(name));
        let dedup = JiDeduplicate::default().with_label(name);
        let stages: [&dyn JiOperator; 3] = [translator, &coerce, &dedup];
        let mut batch = batch;
        for stage in stages {
            batch = execute_operator(stage, batch)?;
        }
        Ok(batch)
    }

    fn prepare_optional(
        &self,
        name: &str,
        source: JiStageOutcome,
        translator: &JiTranslate,
        quality: &mut Vec<JiQualityReport>,
        converter: Option<&JiCurrencyConvert>,
    ) -> Result<JiStageOutcome> {
        let batch = match source {
            JiStageOutcome::Present(batch) => batch,
            absent => {
                log::warn!("{} unavailable: {}", name, absent.reason().unwrap_or("unknown"));
                return Ok(absent);
            }
        };
        let mut batch = self.prepare(name, batch, translator, quality)?;
        if let Some(converter) = converter {
            batch = execute_operator(converter, batch)?;
        }
        Ok(JiStageOutcome::Present(batch))
    }

    fn aggregators(&self) -> [JiChildAggregator; 3] {
        [
            JiChildAggregator::payments(),
            JiChildAggregator::items(),
            JiChildAggregator::reviews(),
        ]
        .map(|aggregator| {
            aggregator
                .with_resolver(self.resolver.clone())
                .with_undefined_label(self.config.undefined_label.clone())
        })
    }

    /// Aggregates payments, items and reviews, in that order.
    fn aggregate(
        &self,
        payments: &JiStageOutcome,
        items: &JiStageOutcome,
        reviews: &JiStageOutcome,
    ) -> Vec<JiStageOutcome> {
        let [by_payments, by_items, by_reviews] = self.aggregators();
        let run = |aggregator: &JiChildAggregator, source: &JiStageOutcome| match source.batch() {
            Some(batch) => aggregator.aggregate(batch),
            None => JiStageOutcome::absent(
                aggregator.stage(),
                source.reason().unwrap_or("source table unavailable").to_string(),
            ),
        };

        #[cfg(feature = "parallel")]
        {
            let (payments, (items, reviews)) = rayon::join(
                || run(&by_payments, payments),
                || rayon::join(|| run(&by_items, items), || run(&by_reviews, reviews)),
            );
            vec![payments, items, reviews]
        }
        #[cfg(not(feature = "parallel"))]
        {
            vec![
                run(&by_payments, payments),
                run(&by_items, items),
                run(&by_reviews, reviews),
            ]
        }
    }

    fn apply_binning(&self, mut batch: JiRecordBatch) -> Result<JiRecordBatch> {
        let columns = JiColumnSet::from_batch(&batch);
        for rule in &self.config.binning {
            let column = match (rule.field, &rule.column) {
                (Some(field), _) => self.resolver.resolve(&columns, field).map(str::to_string),
                (None, Some(column)) => Some(column.clone()),
                (None, None) => None,
            };
            let Some(column) = column else {
                log::warn!("binning '{}': input column not found, skipped", rule.output);
                continue;
            };
            let binner = JiBinner::new(column, rule.output.clone(), rule.spec.clone());
            batch = execute_operator(&binner, batch)?;
        }
        Ok(batch)
    }
}

fn date_fields(table: &str) -> Vec<JiField> {
    match table {
        "orders" => vec![
            JiField::PurchaseTimestamp,
            JiField::ApprovedTimestamp,
            JiField::CarrierTimestamp,
            JiField::DeliveredTimestamp,
            JiField::EstimatedTimestamp,
        ],
        "order_items" => vec![JiField::ShippingLimitTimestamp],
        "order_reviews" => vec![JiField::ReviewCreated, JiField::ReviewAnswered],
        _ => Vec::new(),
    }
}

fn numeric_fields(table: &str) -> Vec<JiField> {
    match table {
        "order_items" => vec![JiField::ItemSequence, JiField::Price, JiField::Freight],
        "order_payments" => vec![
            JiField::PaymentSequence,
            JiField::PaymentInstallments,
            JiField::PaymentValue,
        ],
        "order_reviews" => vec![JiField::ReviewScore],
        _ => Vec::new(),
    }
}

#[cfg(feature = "csv")]
mod files {
    use super::*;
    use crate::export::{JiCsvWriter, JiWriteStats};
    use crate::ingest::JiCsvReader;
    use crate::record::JiRecord;

    impl JiUnificationPipeline {
        /// Reads every configured input file from `data_dir`.
        pub fn load(&self) -> JiSourceTables {
            let reader = JiCsvReader::new(self.config.read.clone());
            let files = &self.config.files;
            let read = |file: &str| reader.read_path(&self.config.input_path(file));
            JiSourceTables {
                orders: read(&files.orders),
                order_items: read(&files.order_items),
                order_payments: read(&files.order_payments),
                order_reviews: read(&files.order_reviews),
                customers: read(&files.customers),
                product_category: read(&files.product_category),
            }
        }

        /// Writes the unified table and, when segmentation ran, the
        /// per-customer RFM table into `output_dir`.
        pub fn write(&self, output: &JiPipelineOutput) -> Result<Vec<JiWriteStats>> {
            let writer = JiCsvWriter::new(self.config.write.clone());
            let mut stats = vec![writer.write(
                &output.unified,
                &self.config.output_path(&self.config.output_file),
            )?];
            if !output.rfm.is_skipped() {
                let customers = output
                    .rfm
                    .customers
                    .iter()
                    .map(|customer| {
                        serde_json::to_value(customer)
                            .map(|payload| JiRecord::new(Some(customer.customer_id.clone()), payload))
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                stats.push(writer.write(
                    &customers,
                    &self.config.output_path(&self.config.customers_output_file),
                )?);
            }
            Ok(stats)
        }

        /// Loads, runs and writes.
        pub fn run_from_files(&self) -> Result<JiPipelineOutput> {
            let output = self.run(self.load())?;
            self.write(&output)?;
            Ok(output)
        }
    }
}
