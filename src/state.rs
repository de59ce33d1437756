use std::collections::BTreeSet;

use crate::data::filter::{self, FieldFilter, FilterSpec};
use crate::data::model::{Dataset, FieldValue, Record};
use crate::data::summary::{self, StatDef, SummaryStats};

// ---------------------------------------------------------------------------
// Dashboard state – the calling layer's side of the pipeline
// ---------------------------------------------------------------------------

/// Everything a dashboard host tracks between interactions, independent of
/// how widgets are rendered. Filters and statistic selections live here as
/// explicit values and are passed into the pipeline on every recompute;
/// the pipeline itself stays stateless.
pub struct DashboardState {
    /// Current dataset snapshot (None until the first load).
    pub dataset: Option<Dataset>,

    /// Per-field filter selections.
    pub filters: FilterSpec,

    /// Which statistics to compute for the metrics row.
    pub stat_defs: Vec<StatDef>,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Status / error message for the host to surface.
    pub status_message: Option<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            dataset: None,
            filters: FilterSpec::default(),
            stat_defs: vec![StatDef::Count],
            visible_indices: Vec::new(),
            status_message: None,
        }
    }
}

impl DashboardState {
    /// Ingest a newly loaded snapshot. Filters reset to pass-through, so
    /// the whole dataset is visible until the user narrows it down.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.filters = FilterSpec::default();
        self.visible_indices = (0..dataset.len()).collect();
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Recompute `visible_indices` after a filter change. A filter that no
    /// longer matches the schema degrades to an empty view plus a status
    /// message rather than an error reaching the host.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            self.visible_indices.clear();
            return;
        };
        match filter::apply(ds, &self.filters) {
            Ok(view) => {
                self.visible_indices = view.indices().to_vec();
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("refilter failed: {e}");
                self.visible_indices.clear();
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Compute the currently selected statistics over the filtered view.
    /// Same fail-soft contract as [`refilter`](Self::refilter): on error
    /// the result is empty and the message is left for the host.
    pub fn summaries(&mut self) -> SummaryStats {
        let Some(ds) = &self.dataset else {
            return SummaryStats::default();
        };
        let result = filter::apply(ds, &self.filters)
            .and_then(|view| summary::summarize(&view, &self.stat_defs));
        match result {
            Ok(stats) => stats,
            Err(e) => {
                log::warn!("summarize failed: {e}");
                self.status_message = Some(e.to_string());
                SummaryStats::default()
            }
        }
    }

    /// The records currently visible, for the table renderer.
    pub fn filtered(&self) -> Vec<&Record> {
        match &self.dataset {
            Some(ds) => self
                .visible_indices
                .iter()
                .map(|&i| &ds.records[i])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Replace the selected statistics.
    pub fn set_stats(&mut self, defs: Vec<StatDef>) {
        self.stat_defs = defs;
    }

    /// Toggle a single value in a field's categorical selection. Toggling
    /// a field that currently carries a range filter replaces the range.
    pub fn toggle_value(&mut self, field: &str, value: &FieldValue) {
        let mut selected = match self.filters.remove(field) {
            Some(FieldFilter::AnyOf(set)) => set,
            _ => BTreeSet::new(),
        };
        if selected.contains(value) {
            selected.remove(value);
        } else {
            selected.insert(value.clone());
        }
        // An emptied selection means "no restriction"; leave the entry out
        // so the filter map stays minimal.
        if !selected.is_empty() {
            self.filters
                .insert(field.to_string(), FieldFilter::AnyOf(selected));
        }
        self.refilter();
    }

    /// Constrain a numeric field to an inclusive range.
    pub fn set_range(&mut self, field: &str, min: f64, max: f64) {
        self.filters
            .insert(field.to_string(), FieldFilter::Range { min, max });
        self.refilter();
    }

    /// Remove any constraint on a field.
    pub fn clear_filter(&mut self, field: &str) {
        self.filters.remove(field);
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::summary::StatValue;

    fn titanic() -> Dataset {
        let rows = [(1, 1, 71.28), (1, 0, 53.1), (2, 1, 13.0), (3, 0, 7.25)];
        Dataset::from_records(
            rows.iter()
                .map(|(pclass, survived, fare)| {
                    Record::new(
                        [
                            ("pclass".to_string(), FieldValue::Integer(*pclass)),
                            ("survived".to_string(), FieldValue::Integer(*survived)),
                            ("fare".to_string(), FieldValue::Float(*fare)),
                        ]
                        .into(),
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn fresh_dataset_is_fully_visible() {
        let mut state = DashboardState::default();
        state.set_dataset(titanic());
        assert_eq!(state.visible_indices, vec![0, 1, 2, 3]);
        assert_eq!(state.filtered().len(), 4);
    }

    #[test]
    fn toggling_narrows_and_untoggling_restores() {
        let mut state = DashboardState::default();
        state.set_dataset(titanic());

        state.toggle_value("pclass", &FieldValue::Integer(1));
        assert_eq!(state.visible_indices, vec![0, 1]);

        state.toggle_value("survived", &FieldValue::Integer(1));
        assert_eq!(state.visible_indices, vec![0]);

        // Untoggle back to pass-through: the filter entry disappears.
        state.toggle_value("pclass", &FieldValue::Integer(1));
        state.toggle_value("survived", &FieldValue::Integer(1));
        assert!(state.filters.is_empty());
        assert_eq!(state.visible_indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn range_filter_through_state() {
        let mut state = DashboardState::default();
        state.set_dataset(titanic());
        state.set_range("fare", 10.0, 60.0);
        assert_eq!(state.visible_indices, vec![1, 2]);
        state.clear_filter("fare");
        assert_eq!(state.visible_indices.len(), 4);
    }

    #[test]
    fn summaries_follow_the_current_filters() {
        let mut state = DashboardState::default();
        state.set_dataset(titanic());
        state.set_stats(vec![
            StatDef::Count,
            StatDef::Mean {
                field: "fare".into(),
            },
        ]);
        state.toggle_value("pclass", &FieldValue::Integer(1));

        let stats = state.summaries();
        assert_eq!(stats.get("count"), Some(&StatValue::Count(2)));
        match stats.get("mean(fare)").unwrap() {
            StatValue::Mean(Some(m)) => assert!((m - 62.19).abs() < 1e-9),
            other => panic!("unexpected stat value: {other:?}"),
        }
    }

    #[test]
    fn bad_filter_degrades_instead_of_erroring() {
        let mut state = DashboardState::default();
        state.set_dataset(titanic());
        state.toggle_value("nonexistent", &FieldValue::Integer(1));

        assert!(state.visible_indices.is_empty());
        assert!(state.status_message.is_some());

        // Clearing the bad filter recovers the full view.
        state.clear_filter("nonexistent");
        assert_eq!(state.visible_indices.len(), 4);
        assert!(state.status_message.is_none());
    }
}
