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

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use encoding_rs::Encoding;
use serde_json::{Map, Value};

use crate::config::JiCsvOptions;
use crate::errors::{JiError, Result};
use crate::outcome::JiStageOutcome;
use crate::record::{JiMetadata, JiRecord, JiRecordBatch};

/// Decodes raw file bytes with the configured encoding.
///
/// A byte order mark is stripped and takes precedence over `encoding`.
/// Malformed input is an error rather than replacement characters.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(JiError::validation(format!(
            "input is not valid {}, check the configured encoding",
            used.name()
        )));
    }
    Ok(text.into_owned())
}

/// Reads delimited text files into Ji tables.
///
/// Every cell is read as a string; empty cells become null. The row index
/// becomes the record id and the source path is kept in the metadata. A
/// missing or unreadable file yields an absent outcome, never an error.
#[derive(Clone, Debug, Default)]
pub struct JiCsvReader {
    options: JiCsvOptions,
}

impl JiCsvReader {
    #[allow(non_snake_case)]
    pub fn new(options: JiCsvOptions) -> Self {
        Self { options }
    }

    pub fn read_path(&self, path: &Path) -> JiStageOutcome {
        let stage = format!("ingest.csv:{}", path.display());
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::error!("file not found: {}", path.display());
                return JiStageOutcome::absent(stage, "file not found");
            }
            Err(err) => {
                log::error!("cannot read {}: {}", path.display(), err);
                return JiStageOutcome::absent(stage, err.to_string());
            }
        };
        let text = match self
            .options
            .encoding
            .resolve()
            .and_then(|encoding| decode(&bytes, encoding))
        {
            Ok(text) => text,
            Err(err) => {
                log::error!("cannot decode {}: {}", path.display(), err);
                return JiStageOutcome::absent(stage, err.to_string());
            }
        };
        match self.parse(&text, &path.display().to_string()) {
            Ok(batch) => {
                let columns = batch
                    .first()
                    .and_then(|r| r.payload.as_object())
                    .map(Map::len)
                    .unwrap_or(0);
                log::info!("{} loaded: {} rows x {} columns", path.display(), batch.len(), columns);
                JiStageOutcome::Present(batch)
            }
            Err(err) => {
                log::error!("cannot parse {}: {}", path.display(), err);
                JiStageOutcome::absent(stage, err.to_string())
            }
        }
    }

    /// Parses CSV text. Malformed rows are skipped with a warning.
    pub fn parse(&self, text: &str, source: &str) -> Result<JiRecordBatch> {
        let delimiter = self.options.delimiter_byte()?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.options.has_headers)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut headers: Vec<String> = if self.options.has_headers {
            reader
                .headers()?
                .iter()
                .map(|h| h.trim().to_string())
                .collect()
        } else {
            Vec::new()
        };

        let mut batch = Vec::new();
        let mut skipped = 0usize;
        for (index, row) in reader.records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(err) => {
                    skipped += 1;
                    log::warn!("{}: skipping row {}: {}", source, index, err);
                    continue;
                }
            };
            while headers.len() < row.len() {
                headers.push(format!("column_{}", headers.len()));
            }
            let mut payload = Map::with_capacity(headers.len());
            for (position, header) in headers.iter().enumerate() {
                let cell = match row.get(position) {
                    Some(cell) if !cell.is_empty() => Value::String(cell.to_string()),
                    _ => Value::Null,
                };
                payload.insert(header.clone(), cell);
            }
            let mut metadata = JiMetadata::new();
            metadata.insert("source".into(), Value::String(source.to_string()));
            batch.push(
                JiRecord::new(Some(index.to_string()), Value::Object(payload)).with_metadata(metadata),
            );
        }
        if skipped > 0 {
            log::warn!("{}: {} malformed rows skipped", source, skipped);
        }
        Ok(batch)
    }
}
