use std::collections::{BTreeMap, BTreeSet};

use super::PipelineError;
use super::model::{Dataset, FieldValue, Record};

// ---------------------------------------------------------------------------
// Filter predicates: per-field acceptance criteria
// ---------------------------------------------------------------------------

/// Acceptance criterion for a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldFilter {
    /// Categorical inclusion: the value must be a member of the set.
    /// An empty set means "no restriction" (everything passes).
    AnyOf(BTreeSet<FieldValue>),
    /// Numeric range, inclusive on both ends. Records whose value is
    /// missing or non-numeric fail.
    Range { min: f64, max: f64 },
}

impl FieldFilter {
    fn accepts(&self, value: &FieldValue) -> bool {
        match self {
            FieldFilter::AnyOf(selected) => selected.is_empty() || selected.contains(value),
            FieldFilter::Range { min, max } => match value.as_f64() {
                Some(v) => *min <= v && v <= *max,
                None => false,
            },
        }
    }
}

/// Per-field filter selections: field name → acceptance criterion.
/// A field absent from the map is unconstrained.
pub type FilterSpec = BTreeMap<String, FieldFilter>;

// ---------------------------------------------------------------------------
// FilteredView – the order-preserving subset passing all filters
// ---------------------------------------------------------------------------

/// The ordered subsequence of a dataset whose records satisfy every filter.
/// Borrowed from the dataset; recomputed on each filter change, never
/// mutated in place.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Number of records passing the filters.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Positions (into the source dataset) of the passing records.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// The passing records, in original dataset order.
    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.indices.iter().map(|&i| &self.dataset.records[i])
    }

    /// The dataset this view was filtered from.
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }
}

// ---------------------------------------------------------------------------
// apply – FilterSpec × Dataset → FilteredView
// ---------------------------------------------------------------------------

/// Apply all filters to a dataset (logical AND across fields).
///
/// A record passes a field's filter when:
/// * The field is not present in `filters` → passes (no constraint)
/// * `AnyOf` with an empty set → passes (nothing selected means show all)
/// * `AnyOf` and the record's value is in the set → passes; a record
///   missing the field reads as `Null`, so it passes only when `Null`
///   is among the selected values
/// * `Range` and the numeric value is within `[min, max]` inclusive
///
/// An empty spec or an empty dataset degenerates to pass-through. Fails
/// with [`PipelineError::SchemaMismatch`] when a filter names a field the
/// (non-empty) dataset's schema does not have.
pub fn apply<'a>(
    dataset: &'a Dataset,
    filters: &FilterSpec,
) -> Result<FilteredView<'a>, PipelineError> {
    // An empty dataset has no schema to validate against; it just yields
    // an empty view.
    if !dataset.is_empty() {
        for field in filters.keys() {
            if !dataset.has_column(field) {
                return Err(PipelineError::SchemaMismatch(field.clone()));
            }
        }
    }

    let indices = dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            filters
                .iter()
                .all(|(field, filter)| filter.accepts(rec.get(field)))
        })
        .map(|(i, _)| i)
        .collect();

    Ok(FilteredView { dataset, indices })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn iris() -> Dataset {
        let rows = [
            ("setosa", 1.0),
            ("setosa", 2.0),
            ("virginica", 5.0),
        ];
        Dataset::from_records(
            rows.iter()
                .map(|(species, petal)| {
                    Record::new(
                        [
                            ("species".to_string(), FieldValue::String(species.to_string())),
                            ("petal_length".to_string(), FieldValue::Float(*petal)),
                        ]
                        .into(),
                    )
                })
                .collect(),
        )
    }

    fn titanic() -> Dataset {
        let rows = [(1, 1), (1, 0), (2, 1), (3, 0)];
        Dataset::from_records(
            rows.iter()
                .map(|(pclass, survived)| {
                    Record::new(
                        [
                            ("pclass".to_string(), FieldValue::Integer(*pclass)),
                            ("survived".to_string(), FieldValue::Integer(*survived)),
                        ]
                        .into(),
                    )
                })
                .collect(),
        )
    }

    fn any_of(values: &[FieldValue]) -> FieldFilter {
        FieldFilter::AnyOf(values.iter().cloned().collect())
    }

    #[test]
    fn empty_spec_is_identity() {
        let ds = iris();
        let view = apply(&ds, &FilterSpec::new()).unwrap();
        assert_eq!(view.indices(), &[0, 1, 2]);
        assert_eq!(view.len(), ds.len());
    }

    #[test]
    fn empty_selection_set_passes_everything() {
        let ds = iris();
        let filters: FilterSpec =
            [("species".to_string(), any_of(&[]))].into();
        let view = apply(&ds, &filters).unwrap();
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn categorical_filter_keeps_matching_rows_in_order() {
        let ds = iris();
        let filters: FilterSpec = [(
            "species".to_string(),
            any_of(&[FieldValue::String("setosa".into())]),
        )]
        .into();

        let view = apply(&ds, &filters).unwrap();
        assert_eq!(view.indices(), &[0, 1]);
        let petals: Vec<f64> = view
            .records()
            .filter_map(|r| r.get("petal_length").as_f64())
            .collect();
        assert_eq!(petals, vec![1.0, 2.0]);
    }

    #[test]
    fn filters_combine_with_logical_and() {
        let ds = titanic();
        let filters: FilterSpec = [
            ("pclass".to_string(), any_of(&[FieldValue::Integer(1)])),
            ("survived".to_string(), any_of(&[FieldValue::Integer(1)])),
        ]
        .into();

        let view = apply(&ds, &filters).unwrap();
        assert_eq!(view.len(), 1);
        let only = view.records().next().unwrap();
        assert_eq!(only.get("pclass"), &FieldValue::Integer(1));
        assert_eq!(only.get("survived"), &FieldValue::Integer(1));
    }

    #[test]
    fn range_filter_is_inclusive() {
        let ds = iris();
        let filters: FilterSpec = [(
            "petal_length".to_string(),
            FieldFilter::Range { min: 1.0, max: 2.0 },
        )]
        .into();

        let view = apply(&ds, &filters).unwrap();
        assert_eq!(view.indices(), &[0, 1]);
    }

    #[test]
    fn range_filter_rejects_non_numeric() {
        let ds = iris();
        let filters: FilterSpec = [(
            "species".to_string(),
            FieldFilter::Range { min: 0.0, max: 10.0 },
        )]
        .into();
        assert!(apply(&ds, &filters).unwrap().is_empty());
    }

    #[test]
    fn unknown_field_is_schema_mismatch() {
        let ds = iris();
        let filters: FilterSpec =
            [("nonexistent".to_string(), any_of(&[FieldValue::Integer(1)]))].into();
        assert_eq!(
            apply(&ds, &filters).unwrap_err(),
            PipelineError::SchemaMismatch("nonexistent".to_string())
        );
    }

    #[test]
    fn empty_dataset_never_errors() {
        let ds = Dataset::default();
        let filters: FilterSpec =
            [("anything".to_string(), any_of(&[FieldValue::Bool(true)]))].into();
        let view = apply(&ds, &filters).unwrap();
        assert!(view.is_empty());
    }

    #[test]
    fn missing_field_passes_only_when_null_selected() {
        let ds = Dataset::from_records(vec![
            Record::new([("deck".to_string(), FieldValue::String("A".into()))].into()),
            Record::new(BTreeMap::new()),
        ]);
        // "deck" is in the schema via the first record; the second
        // record simply lacks it and reads as Null.
        let filters: FilterSpec =
            [("deck".to_string(), any_of(&[FieldValue::Null]))].into();
        let view = apply(&ds, &filters).unwrap();
        assert_eq!(view.indices(), &[1]);
    }
}
