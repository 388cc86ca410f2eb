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

//! Column and categorical value translation.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

use crate::errors::Result;
use crate::operator::JiOperator;
use crate::record::{JiRecord, JiRecordBatch};
use crate::schema::resolve::JiColumnSet;

/// Per-column value dictionaries, keyed by the source column name.
pub type JiValueMaps = BTreeMap<String, BTreeMap<String, String>>;

/// Renames columns and remaps categorical values.
///
/// Only rename entries whose source column exists are applied. A value map
/// registered for a source column is applied to that column under its new
/// name, or under its own name when the table was already translated.
/// Unmapped values are kept as they are, which makes the operator idempotent.
#[derive(Debug, Clone, Default)]
pub struct JiTranslate {
    columns: HashMap<String, String>,
    values: JiValueMaps,
}

impl JiTranslate {
    #[allow(non_snake_case)]
    pub fn new(columns: HashMap<String, String>, values: JiValueMaps) -> Self {
        Self { columns, values }
    }

    /// Rename plan for one table: source name to target name.
    fn plan_renames(&self, present: &JiColumnSet) -> HashMap<&str, &str> {
        let mut plan = HashMap::new();
        for (source, target) in &self.columns {
            if !present.contains(source) || source == target {
                continue;
            }
            if present.contains(target) {
                log::warn!(
                    "{}: both '{}' and '{}' present, keeping both unchanged",
                    self.name(),
                    source,
                    target
                );
                continue;
            }
            plan.insert(source.as_str(), target.as_str());
        }
        plan
    }

    /// Physical column each value map applies to after renaming.
    fn plan_remaps<'a>(
        &'a self,
        present: &JiColumnSet,
        renames: &HashMap<&str, &'a str>,
    ) -> Vec<(&'a str, &'a BTreeMap<String, String>)> {
        let mut plan = Vec::new();
        for (source, mapping) in &self.values {
            let renamed = renames.get(source.as_str()).copied();
            let translated = self.columns.get(source).map(String::as_str);
            let target = match (renamed, translated) {
                (Some(target), _) => Some(target),
                (None, Some(target)) if present.contains(target) => Some(target),
                _ if present.contains(source) => Some(source.as_str()),
                _ => None,
            };
            if let Some(column) = target {
                plan.push((column, mapping));
            }
        }
        plan
    }

    fn translate_row(
        row: Map<String, Value>,
        renames: &HashMap<&str, &str>,
        remaps: &[(&str, &BTreeMap<String, String>)],
    ) -> Map<String, Value> {
        let mut out = Map::with_capacity(row.len());
        for (key, value) in row {
            let key = match renames.get(key.as_str()) {
                Some(target) => target.to_string(),
                None => key,
            };
            out.insert(key, value);
        }
        for (column, mapping) in remaps {
            let replacement = match out.get(*column) {
                Some(Value::String(current)) => mapping.get(current).cloned(),
                _ => None,
            };
            if let Some(replacement) = replacement {
                out.insert(column.to_string(), Value::String(replacement));
            }
        }
        out
    }
}

impl JiOperator for JiTranslate {
    fn name(&self) -> &'static str {
        "schema.translate"
    }

    fn apply(&self, batch: JiRecordBatch) -> Result<JiRecordBatch> {
        let present = JiColumnSet::from_batch(&batch);
        let renames = self.plan_renames(&present);
        let remaps = self.plan_remaps(&present, &renames);
        log::debug!(
            "{}: {} columns renamed, {} value maps applied",
            self.name(),
            renames.len(),
            remaps.len()
        );

        Ok(batch
            .into_iter()
            .map(|mut record| {
                if let Value::Object(row) = &mut record.payload {
                    let taken = std::mem::take(row);
                    *row = Self::translate_row(taken, &renames, &remaps);
                }
                record
            })
            .collect())
    }
}

/// Builds a value dictionary from a two-column translation table, such as
/// the product category name translation file.
pub fn value_map_from_table(
    batch: &[JiRecord],
    key_column: &str,
    value_column: &str,
) -> BTreeMap<String, String> {
    let mut mapping = BTreeMap::new();
    for record in batch {
        if let (Some(key), Some(value)) = (record.key(key_column), record.key(value_column)) {
            mapping.entry(key).or_insert(value);
        }
    }
    mapping
}
