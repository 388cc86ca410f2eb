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
use std::path::{Path, PathBuf};

use encoding_rs::{EncoderResult, UTF_8};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::JiCsvOptions;
use crate::errors::{JiError, Result};
use crate::record::JiRecord;
use crate::schema::JiColumnSet;

/// Statistics about a write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JiWriteStats {
    /// Number of data rows written.
    pub records_written: usize,
    /// Number of columns in the header.
    pub columns: usize,
    /// Size of the file in bytes.
    pub bytes_written: usize,
}

/// Writes Ji tables as delimited text.
///
/// The header is the union of all row columns in first-seen order; null or
/// missing cells are written empty. The destination directory is created when
/// needed and the file is written to a temporary sibling first, then renamed.
#[derive(Debug, Clone)]
pub struct JiCsvWriter {
    options: JiCsvOptions,
    atomic_write: bool,
}

impl Default for JiCsvWriter {
    fn default() -> Self {
        Self::new(JiCsvOptions::default())
    }
}

impl JiCsvWriter {
    #[allow(non_snake_case)]
    pub fn new(options: JiCsvOptions) -> Self {
        Self {
            options,
            atomic_write: true,
        }
    }

    pub fn with_atomic_write(mut self, atomic_write: bool) -> Self {
        self.atomic_write = atomic_write;
        self
    }

    pub fn write(&self, batch: &[JiRecord], path: &Path) -> Result<JiWriteStats> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let columns = JiColumnSet::from_batch(batch);
        let bytes = self.encode(&self.render(batch, &columns)?)?;

        if self.atomic_write {
            let temp = temp_path(path);
            fs::write(&temp, &bytes)?;
            fs::rename(&temp, path)?;
        } else {
            fs::write(path, &bytes)?;
        }

        let stats = JiWriteStats {
            records_written: batch.len(),
            columns: columns.len(),
            bytes_written: bytes.len(),
        };
        log::info!(
            "saved {}: {} rows x {} columns",
            path.display(),
            stats.records_written,
            stats.columns
        );
        Ok(stats)
    }

    fn render(&self, batch: &[JiRecord], columns: &JiColumnSet) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.options.delimiter_byte()?)
            .from_writer(Vec::new());

        if self.options.has_headers && !columns.is_empty() {
            writer.write_record(columns.names())?;
        }
        for record in batch {
            let row: Vec<String> = columns
                .names()
                .iter()
                .map(|column| cell_text(record.get(column)))
                .collect();
            writer.write_record(&row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|err| JiError::Csv(err.to_string()))?;
        String::from_utf8(bytes).map_err(|err| JiError::internal(err.to_string()))
    }

    /// Encodes with the configured encoding. Characters the encoding cannot
    /// represent are written as `?`.
    fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let encoding = self.options.encoding.resolve()?;
        if encoding == UTF_8 {
            return Ok(text.as_bytes().to_vec());
        }

        let mut encoder = encoding.new_encoder();
        let mut out = Vec::with_capacity(text.len());
        let mut rest = text;
        let mut replaced = 0usize;
        loop {
            let needed = encoder
                .max_buffer_length_from_utf8_without_replacement(rest.len())
                .unwrap_or(rest.len() * 4 + 16);
            out.reserve(needed);
            let (result, read) = encoder.encode_from_utf8_to_vec_without_replacement(rest, &mut out, true);
            rest = &rest[read..];
            match result {
                EncoderResult::InputEmpty => break,
                EncoderResult::OutputFull => continue,
                EncoderResult::Unmappable(_) => {
                    replaced += 1;
                    out.push(b'?');
                }
            }
        }
        if replaced > 0 {
            log::warn!(
                "{} characters not representable in {} replaced by '?'",
                replaced,
                encoding.name()
            );
        }
        Ok(out)
    }
}

fn cell_text(cell: Option<&Value>) -> String {
    match cell {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("output");
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!(".{}.tmp", name))
}
