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

//! # Stage Outcome Module
//!
//! Stages that can fail soft (a missing file, an unresolvable key column, an
//! empty child table) return a [`JiStageOutcome`] instead of an error. The
//! absent variant always carries the stage name and a reason, so callers can
//! report "feature unavailable" without guessing why.

use serde::{Deserialize, Serialize};

use crate::record::JiRecordBatch;

/// A table produced by a stage, or the reason why no table was produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum JiStageOutcome {
    /// The stage produced a table.
    Present(JiRecordBatch),
    /// The stage produced nothing usable.
    Absent { stage: String, reason: String },
}

impl JiStageOutcome {
    /// Builds an absent outcome.
    #[allow(non_snake_case)]
    pub fn absent(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        JiStageOutcome::Absent {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, JiStageOutcome::Present(_))
    }

    /// Borrows the table when present.
    pub fn batch(&self) -> Option<&JiRecordBatch> {
        match self {
            JiStageOutcome::Present(batch) => Some(batch),
            JiStageOutcome::Absent { .. } => None,
        }
    }

    /// Consumes the outcome, returning the table when present.
    pub fn into_batch(self) -> Option<JiRecordBatch> {
        match self {
            JiStageOutcome::Present(batch) => Some(batch),
            JiStageOutcome::Absent { .. } => None,
        }
    }

    /// The reason recorded for an absent outcome.
    pub fn reason(&self) -> Option<&str> {
        match self {
            JiStageOutcome::Present(_) => None,
            JiStageOutcome::Absent { reason, .. } => Some(reason),
        }
    }

    /// Number of rows, zero when absent.
    pub fn len(&self) -> usize {
        self.batch().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
