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

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{JiError, Result};
use crate::operator::JiOperator;
use crate::record::JiRecordBatch;
use crate::schema::{parse_number, JiColumnSet};

/// Edge as written in configuration: a number, or `"inf"` / `"-inf"`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum EdgeRepr {
    Number(f64),
    Text(String),
}

impl EdgeRepr {
    fn into_f64(self) -> Result<f64> {
        match self {
            EdgeRepr::Number(n) => Ok(n),
            EdgeRepr::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "inf" | "+inf" | "infinity" | ".inf" => Ok(f64::INFINITY),
                "-inf" | "-infinity" | "-.inf" => Ok(f64::NEG_INFINITY),
                other => other
                    .parse::<f64>()
                    .map_err(|_| JiError::validation(format!("invalid bin edge '{}'", text))),
            },
        }
    }

    fn from_f64(n: f64) -> Self {
        if n == f64::INFINITY {
            EdgeRepr::Text("inf".into())
        } else if n == f64::NEG_INFINITY {
            EdgeRepr::Text("-inf".into())
        } else {
            EdgeRepr::Number(n)
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct BinSpecRepr {
    edges: Vec<EdgeRepr>,
    labels: Vec<String>,
}

/// Ordered edges and labels describing a discretization.
///
/// Interval `i` is `(edges[i], edges[i + 1]]`; the lowest edge is inclusive
/// so the minimum value is always classified.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BinSpecRepr", into = "BinSpecRepr")]
pub struct JiBinSpec {
    edges: Vec<f64>,
    labels: Vec<String>,
}

impl TryFrom<BinSpecRepr> for JiBinSpec {
    type Error = JiError;

    fn try_from(repr: BinSpecRepr) -> Result<Self> {
        let edges = repr
            .edges
            .into_iter()
            .map(EdgeRepr::into_f64)
            .collect::<Result<Vec<_>>>()?;
        JiBinSpec::new(edges, repr.labels)
    }
}

impl From<JiBinSpec> for BinSpecRepr {
    fn from(spec: JiBinSpec) -> Self {
        BinSpecRepr {
            edges: spec.edges.into_iter().map(EdgeRepr::from_f64).collect(),
            labels: spec.labels,
        }
    }
}

impl JiBinSpec {
    /// Validates and builds a spec. Edges must be strictly increasing and
    /// there must be exactly one label per interval.
    #[allow(non_snake_case)]
    pub fn new(edges: Vec<f64>, labels: Vec<String>) -> Result<Self> {
        if edges.len() < 2 {
            return Err(JiError::validation("binning needs at least two edges"));
        }
        if labels.len() != edges.len() - 1 {
            return Err(JiError::validation(format!(
                "binning has {} edges but {} labels, expected {}",
                edges.len(),
                labels.len(),
                edges.len() - 1
            )));
        }
        if edges.iter().any(|e| e.is_nan()) {
            return Err(JiError::validation("binning edges must not be NaN"));
        }
        if edges.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(JiError::validation("binning edges must be strictly increasing"));
        }
        Ok(Self { edges, labels })
    }

    /// Builds a spec from possibly repeated quantile edges.
    ///
    /// Empty intervals between equal edges are dropped together with their
    /// labels; each surviving interval keeps the label of the first original
    /// interval that ends on its upper edge. Returns `None` when every edge
    /// is equal.
    pub fn collapsed(edges: &[f64], labels: &[String]) -> Option<Self> {
        if edges.len() < 2 || labels.len() != edges.len() - 1 {
            return None;
        }
        let mut kept_edges = vec![edges[0]];
        let mut kept_labels = Vec::new();
        for (k, edge) in edges.iter().enumerate().skip(1) {
            let last = kept_edges[kept_edges.len() - 1];
            if *edge > last {
                kept_edges.push(*edge);
                kept_labels.push(labels[k - 1].clone());
            }
        }
        if kept_labels.is_empty() {
            return None;
        }
        Self::new(kept_edges, kept_labels).ok()
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Index of the interval containing `value`, if any.
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        let lowest = self.edges[0];
        let highest = self.edges[self.edges.len() - 1];
        if value < lowest || value > highest {
            return None;
        }
        if value == lowest {
            return Some(0);
        }
        // first edge >= value closes the interval
        let upper = self.edges.partition_point(|edge| *edge < value);
        Some(upper - 1)
    }

    /// Label of the interval containing `value`, if any.
    pub fn assign(&self, value: f64) -> Option<&str> {
        self.bin_index(value).map(|i| self.labels[i].as_str())
    }
}

/// Writes the bin label of a numeric column into a new categorical column.
///
/// Null, non-numeric and out-of-range values get a null label.
#[derive(Debug, Clone)]
pub struct JiBinner {
    column: String,
    output: String,
    spec: JiBinSpec,
}

impl JiBinner {
    #[allow(non_snake_case)]
    pub fn new(column: impl Into<String>, output: impl Into<String>, spec: JiBinSpec) -> Self {
        Self {
            column: column.into(),
            output: output.into(),
            spec,
        }
    }

    pub fn spec(&self) -> &JiBinSpec {
        &self.spec
    }
}

impl JiOperator for JiBinner {
    fn name(&self) -> &'static str {
        "binning.cut"
    }

    fn apply(&self, mut batch: JiRecordBatch) -> Result<JiRecordBatch> {
        if !JiColumnSet::from_batch(&batch).contains(&self.column) {
            log::warn!(
                "{}: column '{}' not found, '{}' not created",
                self.name(),
                self.column,
                self.output
            );
            return Ok(batch);
        }

        let mut unbound = 0usize;
        for record in batch.iter_mut() {
            let label = record
                .get(&self.column)
                .and_then(parse_number)
                .and_then(|value| self.spec.assign(value))
                .map(|label| Value::String(label.to_string()));
            if label.is_none() {
                unbound += 1;
            }
            record.set(self.output.clone(), label.unwrap_or(Value::Null));
        }

        log::info!(
            "{}: '{}' binned into '{}' ({} rows without a category)",
            self.name(),
            self.column,
            self.output,
            unbound
        );
        Ok(batch)
    }
}
