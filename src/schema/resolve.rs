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

//! Logical field resolution.
//!
//! The same logical field can reach a stage under its source name
//! (`order_id`) or under a translated name (`id_ordine`), depending on which
//! step produced the table. [`JiColumnResolver`] resolves a [`JiField`]
//! against the physical columns of one table by walking a priority-ordered
//! candidate list. Every table is resolved on its own; no stage assumes a
//! global rename already happened.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::errors::{JiError, Result};
use crate::record::JiRecord;

/// Logical fields known to the unification pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JiField {
    // orders
    OrderId,
    CustomerId,
    OrderStatus,
    PurchaseTimestamp,
    ApprovedTimestamp,
    CarrierTimestamp,
    DeliveredTimestamp,
    EstimatedTimestamp,
    // customers
    CustomerUniqueId,
    CustomerZipPrefix,
    CustomerCity,
    CustomerState,
    // order items
    ItemSequence,
    ProductId,
    SellerId,
    ShippingLimitTimestamp,
    Price,
    Freight,
    PriceEur,
    FreightEur,
    // payments
    PaymentSequence,
    PaymentType,
    PaymentInstallments,
    PaymentValue,
    PaymentValueEur,
    // reviews
    ReviewId,
    ReviewScore,
    ReviewCreated,
    ReviewAnswered,
    // child-table aggregates
    PrincipalPaymentType,
    PaymentTotal,
    PaymentTotalEur,
    PaymentCount,
    MaxInstallments,
    ItemCount,
    PriceTotal,
    FreightTotal,
    OrderTotalEur,
    ReviewScoreMean,
    ReviewCount,
    FirstReviewCreated,
    LastReviewAnswered,
    // temporal features
    ApprovalToShipmentDays,
    DeliveryDays,
    DeliveryDelayDays,
    PurchaseYear,
    PurchaseMonth,
    PurchaseWeekday,
    // segmentation
    CustomerSegment,
}

impl JiField {
    /// Human readable description used in log messages.
    pub fn description(self) -> &'static str {
        match self {
            JiField::OrderId => "order identifier",
            JiField::CustomerId => "customer identifier",
            JiField::OrderStatus => "order status",
            JiField::PurchaseTimestamp => "purchase timestamp",
            JiField::ApprovedTimestamp => "approval timestamp",
            JiField::CarrierTimestamp => "carrier handoff timestamp",
            JiField::DeliveredTimestamp => "customer delivery timestamp",
            JiField::EstimatedTimestamp => "estimated delivery timestamp",
            JiField::CustomerUniqueId => "customer unique identifier",
            JiField::CustomerZipPrefix => "customer zip prefix",
            JiField::CustomerCity => "customer city",
            JiField::CustomerState => "customer state",
            JiField::ItemSequence => "item sequence number",
            JiField::ProductId => "product identifier",
            JiField::SellerId => "seller identifier",
            JiField::ShippingLimitTimestamp => "shipping limit timestamp",
            JiField::Price => "unit price",
            JiField::Freight => "freight cost",
            JiField::PriceEur => "unit price (EUR)",
            JiField::FreightEur => "freight cost (EUR)",
            JiField::PaymentSequence => "payment sequence number",
            JiField::PaymentType => "payment type",
            JiField::PaymentInstallments => "installment count",
            JiField::PaymentValue => "payment amount",
            JiField::PaymentValueEur => "payment amount (EUR)",
            JiField::ReviewId => "review identifier",
            JiField::ReviewScore => "review score",
            JiField::ReviewCreated => "review creation timestamp",
            JiField::ReviewAnswered => "review answer timestamp",
            JiField::PrincipalPaymentType => "principal payment type",
            JiField::PaymentTotal => "payment total",
            JiField::PaymentTotalEur => "payment total (EUR)",
            JiField::PaymentCount => "payment count",
            JiField::MaxInstallments => "maximum installments",
            JiField::ItemCount => "item count",
            JiField::PriceTotal => "price total",
            JiField::FreightTotal => "freight total",
            JiField::OrderTotalEur => "order total (EUR)",
            JiField::ReviewScoreMean => "mean review score",
            JiField::ReviewCount => "review count",
            JiField::FirstReviewCreated => "first review creation",
            JiField::LastReviewAnswered => "last review answer",
            JiField::ApprovalToShipmentDays => "approval to shipment days",
            JiField::DeliveryDays => "purchase to delivery days",
            JiField::DeliveryDelayDays => "delivery delay days",
            JiField::PurchaseYear => "purchase year",
            JiField::PurchaseMonth => "purchase month",
            JiField::PurchaseWeekday => "purchase weekday",
            JiField::CustomerSegment => "customer segment",
        }
    }

    /// Built-in candidates: translated name first, source name second.
    fn default_candidates(self) -> &'static [&'static str] {
        match self {
            JiField::OrderId => &["id_ordine", "order_id"],
            JiField::CustomerId => &["id_cliente", "customer_id"],
            JiField::OrderStatus => &["stato_ordine", "order_status"],
            JiField::PurchaseTimestamp => &["data_acquisto", "order_purchase_timestamp"],
            JiField::ApprovedTimestamp => &["data_approvazione", "order_approved_at"],
            JiField::CarrierTimestamp => &["data_spedizione", "order_delivered_carrier_date"],
            JiField::DeliveredTimestamp => &["data_consegna", "order_delivered_customer_date"],
            JiField::EstimatedTimestamp => {
                &["data_consegna_stimata", "order_estimated_delivery_date"]
            }
            JiField::CustomerUniqueId => &["id_cliente_univoco", "customer_unique_id"],
            JiField::CustomerZipPrefix => &["cap_cliente", "customer_zip_code_prefix"],
            JiField::CustomerCity => &["citta_cliente", "customer_city"],
            JiField::CustomerState => &["stato_cliente", "customer_state"],
            JiField::ItemSequence => &["id_articolo_ordine", "order_item_id"],
            JiField::ProductId => &["id_prodotto", "product_id"],
            JiField::SellerId => &["id_venditore", "seller_id"],
            JiField::ShippingLimitTimestamp => &["data_limite_spedizione", "shipping_limit_date"],
            JiField::Price => &["prezzo", "price"],
            JiField::Freight => &["costo_spedizione", "freight_value"],
            JiField::PriceEur => &["prezzo_eur", "price_eur"],
            JiField::FreightEur => &["costo_spedizione_eur", "freight_value_eur"],
            JiField::PaymentSequence => &["sequenza_pagamento", "payment_sequential"],
            JiField::PaymentType => &["tipo_pagamento", "payment_type"],
            JiField::PaymentInstallments => &["rate_pagamento", "payment_installments"],
            JiField::PaymentValue => &["valore_pagamento", "payment_value"],
            JiField::PaymentValueEur => &["valore_pagamento_eur", "payment_value_eur"],
            JiField::ReviewId => &["id_recensione", "review_id"],
            JiField::ReviewScore => &["punteggio_recensione", "review_score"],
            JiField::ReviewCreated => &["data_creazione_recensione", "review_creation_date"],
            JiField::ReviewAnswered => &["data_risposta_recensione", "review_answer_timestamp"],
            JiField::PrincipalPaymentType => {
                &["tipo_pagamento_principale", "principal_payment_type"]
            }
            JiField::PaymentTotal => &["valore_pagamento_totale", "payment_value_total"],
            JiField::PaymentTotalEur => &["valore_pagamento_totale_eur", "payment_value_total_eur"],
            JiField::PaymentCount => &["numero_pagamenti", "payment_count"],
            JiField::MaxInstallments => &["massimo_rate", "max_installments"],
            JiField::ItemCount => &["numero_articoli", "item_count"],
            JiField::PriceTotal => &["totale_prezzo", "price_total"],
            JiField::FreightTotal => &["totale_spedizione", "freight_total"],
            JiField::OrderTotalEur => &["totale_ordine_eur", "order_total_eur"],
            JiField::ReviewScoreMean => &["punteggio_medio_recensioni", "review_score_mean"],
            JiField::ReviewCount => &["numero_recensioni", "review_count"],
            JiField::FirstReviewCreated => &["data_prima_recensione", "first_review_created"],
            JiField::LastReviewAnswered => &["data_ultima_risposta", "last_review_answered"],
            JiField::ApprovalToShipmentDays => {
                &["giorni_approvazione_spedizione", "approval_to_shipment_days"]
            }
            JiField::DeliveryDays => &["giorni_consegna", "delivery_days"],
            JiField::DeliveryDelayDays => &["differenza_giorni_stima", "delivery_delay_days"],
            JiField::PurchaseYear => &["anno_acquisto", "purchase_year"],
            JiField::PurchaseMonth => &["mese_acquisto", "purchase_month"],
            JiField::PurchaseWeekday => &["giorno_settimana_acquisto", "purchase_weekday"],
            JiField::CustomerSegment => &["segmento_cliente", "customer_segment"],
        }
    }
}

/// Physical column names of one table, in first-seen order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JiColumnSet {
    ordered: Vec<String>,
    lookup: HashSet<String>,
}

impl JiColumnSet {
    /// Collects the union of payload keys over all rows.
    #[allow(non_snake_case)]
    pub fn from_batch(batch: &[JiRecord]) -> Self {
        let mut set = JiColumnSet::default();
        for record in batch {
            if let Some(row) = record.payload.as_object() {
                for key in row.keys() {
                    set.push(key);
                }
            }
        }
        set
    }

    #[allow(non_snake_case)]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = JiColumnSet::default();
        for name in names {
            set.push(name.as_ref());
        }
        set
    }

    fn push(&mut self, name: &str) {
        if self.lookup.insert(name.to_string()) {
            self.ordered.push(name.to_string());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains(name)
    }

    pub fn names(&self) -> &[String] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

/// Priority-ordered candidate resolution for [`JiField`]s.
#[derive(Clone, Debug, Default)]
pub struct JiColumnResolver {
    overrides: HashMap<JiField, Vec<String>>,
}

impl JiColumnResolver {
    /// Resolver with the built-in candidate lists.
    #[allow(non_snake_case)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver whose candidate lists are replaced per field by `overrides`.
    pub fn from_overrides(overrides: &HashMap<JiField, Vec<String>>) -> Result<Self> {
        let mut resolver = Self::new();
        for (field, candidates) in overrides {
            resolver = resolver.with_candidates(*field, candidates.clone())?;
        }
        Ok(resolver)
    }

    /// Replaces the candidate list of one field.
    pub fn with_candidates(mut self, field: JiField, candidates: Vec<String>) -> Result<Self> {
        if candidates.is_empty() {
            return Err(JiError::validation(format!(
                "candidate list for {:?} must not be empty",
                field
            )));
        }
        self.overrides.insert(field, candidates);
        Ok(self)
    }

    /// Candidate physical names for `field`, highest priority first.
    pub fn candidates(&self, field: JiField) -> Vec<&str> {
        match self.overrides.get(&field) {
            Some(names) => names.iter().map(String::as_str).collect(),
            None => field.default_candidates().to_vec(),
        }
    }

    /// Name under which stages write `field` when they produce it.
    pub fn canonical(&self, field: JiField) -> &str {
        match self.overrides.get(&field).and_then(|names| names.first()) {
            Some(name) => name.as_str(),
            None => field.default_candidates()[0],
        }
    }

    /// First candidate of `field` present in `columns`.
    pub fn resolve(&self, columns: &JiColumnSet, field: JiField) -> Option<&str> {
        self.candidates(field)
            .into_iter()
            .find(|name| columns.contains(name))
    }

    /// Like [`resolve`](Self::resolve) but logs a warning when nothing matches.
    pub fn resolve_or_warn(
        &self,
        columns: &JiColumnSet,
        field: JiField,
        context: &str,
    ) -> Option<&str> {
        let resolved = self.resolve(columns, field);
        if resolved.is_none() {
            log::warn!(
                "{}: no column for {} (tried {:?}), dependent features skipped",
                context,
                field.description(),
                self.candidates(field)
            );
        }
        resolved
    }

    /// Resolves the first available field of a fallback chain.
    pub fn resolve_first(
        &self,
        columns: &JiColumnSet,
        fields: &[JiField],
    ) -> Option<(JiField, &str)> {
        fields
            .iter()
            .find_map(|field| self.resolve(columns, *field).map(|name| (*field, name)))
    }
}
