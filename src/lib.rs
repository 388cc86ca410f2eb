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

//! # Ji Core Library
//!
//! Ji unifies the related tables of an e-commerce order dataset (orders,
//! order items, payments, reviews, customers) into one row per order and
//! derives an RFM customer segmentation from the result.
//!
//! ## Module Overview
//!
//! - **record**: JiRecord and table representation
//! - **outcome**: Present-or-absent results of stages that fail soft
//! - **schema**: Logical field resolution, translation and type coercion
//! - **operator**: The operator trait shared by row-preserving stages
//! - **operators**: Aggregation, binning, currency conversion, deduplication,
//!   RFM segmentation, temporal features and unification
//! - **inspect**: Data-quality reports and dataset summaries
//! - **config**: Pipeline configuration with Olist defaults
//! - **pipeline**: The end-to-end unification pipeline
//! - **ingest** / **export**: CSV reading and writing
//!
//! ## Feature Flags
//!
//! - `csv`: Enables CSV ingest and export
//! - `parallel`: Runs the three child aggregations on the Rayon pool
//! - `full`: Enables all features
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jix::{JiConfig, JiUnificationPipeline};
//!
//! let pipeline = JiUnificationPipeline::new(JiConfig::default())?;
//! let output = pipeline.run_from_files()?;
//! println!("{:?}", output.rfm.stats);
//! ```
//!
//! ## Error Handling
//!
//! Hard failures return `Result<T, JiError>`. A missing file, column or
//! child table is a soft failure: the stage reports it as
//! [`JiStageOutcome::Absent`] and the run continues with degraded output.

pub mod config;
pub mod errors;
pub mod inspect;
pub mod operator;
pub mod operators;
pub mod outcome;
pub mod pipeline;
pub mod record;
pub mod schema;

#[cfg(feature = "csv")]
pub mod export;
#[cfg(feature = "csv")]
pub mod ingest;

pub use config::{JiBinningRule, JiConfig, JiCsvOptions, JiDatasetFiles, JiEncoding};
pub use errors::{JiError, Result};
pub use inspect::{JiDatasetSummary, JiQualityReport};
pub use operator::{execute_operator, JiOperator};
pub use operators::{
    quantile_scores, JiAggregateColumn, JiAggregation, JiBinSpec, JiBinner, JiChildAggregator,
    JiCurrencyConvert, JiDatasetUnifier, JiDeduplicate, JiRfmOutcome, JiRfmRecord, JiRfmSegmenter,
    JiSegment, JiSegmentStats, JiTemporalFeatures,
};
pub use outcome::JiStageOutcome;
pub use pipeline::{JiPipelineOutput, JiSourceTables, JiUnificationPipeline};
pub use record::{JiMetadata, JiRecord, JiRecordBatch};
pub use schema::{JiCoerce, JiColumnResolver, JiColumnSet, JiField, JiTranslate};

#[cfg(feature = "csv")]
pub use export::{JiCsvWriter, JiWriteStats};
#[cfg(feature = "csv")]
pub use ingest::JiCsvReader;
