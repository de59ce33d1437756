//! rusty-dash – the data core of an interactive dashboard.
//!
//! Takes a tabular snapshot from whatever backend the host talks to,
//! applies user-selected per-field filters, and computes summary
//! statistics (counts, means, group means) over the surviving rows.
//! Widgets, charts, and connections stay on the host's side of the seam;
//! this crate only deals in plain data.
//!
//! Typical flow:
//! ```
//! use rusty_dash::data::loader;
//! use rusty_dash::data::summary::StatDef;
//! use rusty_dash::state::DashboardState;
//!
//! let dataset = loader::parse_json_records(
//!     r#"[{"species": "setosa", "petal_length": 1.4},
//!         {"species": "virginica", "petal_length": 5.1}]"#,
//! )?;
//!
//! let mut state = DashboardState::default();
//! state.set_dataset(dataset);
//! state.set_stats(vec![StatDef::Count, StatDef::parse("mean(petal_length)")?]);
//!
//! let stats = state.summaries();
//! assert_eq!(state.filtered().len(), 2);
//! assert_eq!(stats.len(), 2);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cache;
pub mod data;
pub mod state;

pub use data::PipelineError;
pub use data::filter::{FieldFilter, FilterSpec, FilteredView, apply};
pub use data::model::{Dataset, FieldValue, Record};
pub use data::summary::{StatDef, StatValue, SummaryStats, summarize};
