use anyhow::Result;

use super::model::Dataset;

// ---------------------------------------------------------------------------
// DataSource – the seam where a real connector plugs in
// ---------------------------------------------------------------------------

/// Something that can produce a dataset snapshot for a named table.
/// Implemented by the hosting application over whatever backend it talks
/// to; the pipeline only ever sees the resulting [`Dataset`].
pub trait DataSource {
    fn fetch(&mut self, table: &str) -> Result<Dataset>;
}

/// A snapshot as handed to the pipeline: always a usable dataset, plus an
/// optional condition message when the fetch went wrong.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub dataset: Dataset,
    /// Human-readable description of a fetch failure, for the status line.
    pub condition: Option<String>,
}

impl Snapshot {
    pub fn is_degraded(&self) -> bool {
        self.condition.is_some()
    }
}

/// Fetch a table snapshot, translating any connector error into an empty
/// dataset plus a reported condition. An interactive dashboard shows a
/// message and keeps running; it never crashes on a failed load.
pub fn snapshot(source: &mut dyn DataSource, table: &str) -> Snapshot {
    match source.fetch(table) {
        Ok(dataset) => {
            log::info!("loaded {} records from table '{table}'", dataset.len());
            Snapshot {
                dataset,
                condition: None,
            }
        }
        Err(e) => {
            log::warn!("fetching table '{table}' failed: {e:#}");
            Snapshot {
                dataset: Dataset::default(),
                condition: Some(format!("Error loading '{table}': {e:#}")),
            }
        }
    }
}
