//! Data layer: core types, loading, filtering, and summarizing.
//!
//! Architecture:
//! ```text
//!  backend JSON / .csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse snapshot → Dataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ Dataset   │  Vec<Record>, column index
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  apply per-field predicates → FilteredView
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ summary   │  count / mean / group-mean → SummaryStats
//!   └──────────┘
//! ```

use thiserror::Error;

pub mod filter;
pub mod loader;
pub mod model;
pub mod source;
pub mod summary;

/// Failures the pipeline can report. All of these are recoverable by the
/// caller: surface a message and fall back to an empty view or an
/// undefined statistic, never abort the host.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// A filter references a field absent from the dataset's schema.
    #[error("filter references unknown field '{0}'")]
    SchemaMismatch(String),

    /// A statistic references a field absent from the view's schema.
    #[error("statistic references unknown field '{0}'")]
    FieldNotFound(String),

    /// An aggregation kind the pipeline does not implement.
    #[error("unknown statistic '{0}'")]
    UnknownStatistic(String),
}
