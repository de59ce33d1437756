use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::PipelineError;
use super::filter::FilteredView;
use super::model::FieldValue;

// ---------------------------------------------------------------------------
// StatDef – which aggregations to compute
// ---------------------------------------------------------------------------

/// One requested aggregation over a filtered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatDef {
    /// Number of records in the view.
    Count,
    /// Arithmetic mean of a numeric field, ignoring null/missing cells.
    Mean { field: String },
    /// Mean of `field` per distinct value of `by`.
    GroupMean { field: String, by: String },
}

impl StatDef {
    /// Parse the widget-layer string form: `count`, `mean(field)`,
    /// `group_mean(field, by)`. Anything else is [`PipelineError::UnknownStatistic`].
    pub fn parse(spec: &str) -> Result<Self, PipelineError> {
        let spec = spec.trim();
        if spec == "count" {
            return Ok(StatDef::Count);
        }
        if let Some(inner) = spec
            .strip_prefix("mean(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return Ok(StatDef::Mean {
                field: inner.trim().to_string(),
            });
        }
        if let Some(inner) = spec
            .strip_prefix("group_mean(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            if let Some((field, by)) = inner.split_once(',') {
                return Ok(StatDef::GroupMean {
                    field: field.trim().to_string(),
                    by: by.trim().to_string(),
                });
            }
        }
        Err(PipelineError::UnknownStatistic(spec.to_string()))
    }

    /// Canonical display name, used as the key in [`SummaryStats`].
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StatDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatDef::Count => write!(f, "count"),
            StatDef::Mean { field } => write!(f, "mean({field})"),
            StatDef::GroupMean { field, by } => write!(f, "mean({field}) by {by}"),
        }
    }
}

// ---------------------------------------------------------------------------
// StatValue / SummaryStats – the computed results
// ---------------------------------------------------------------------------

/// A computed statistic. A mean over zero contributing cells is
/// `Mean(None)` ("undefined"), deliberately distinct from zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StatValue {
    Count(usize),
    Mean(Option<f64>),
    /// Group key → group mean. Groups contributing no numeric value are
    /// absent, never zero-valued.
    GroupMeans(#[serde(serialize_with = "ser_group_means")] BTreeMap<FieldValue, f64>),
}

/// JSON object keys must be strings; render group keys via their display
/// form for the rendering layer.
fn ser_group_means<S: serde::Serializer>(
    map: &BTreeMap<FieldValue, f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(map.iter().map(|(key, mean)| (key.to_string(), mean)))
}

/// Ordered statistic results, one entry per requested [`StatDef`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    entries: Vec<(String, StatValue)>,
}

impl SummaryStats {
    pub fn get(&self, name: &str) -> Option<&StatValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Entries in the order the StatDefs were supplied.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StatValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// summarize – FilteredView × StatDefs → SummaryStats
// ---------------------------------------------------------------------------

/// Compute every requested statistic over the view. Pure and synchronous;
/// holds no state between calls.
///
/// Fails with [`PipelineError::FieldNotFound`] when a statistic names a
/// field the (non-empty) underlying dataset does not have.
pub fn summarize(view: &FilteredView<'_>, defs: &[StatDef]) -> Result<SummaryStats, PipelineError> {
    let dataset = view.dataset();
    let check_field = |field: &str| -> Result<(), PipelineError> {
        if !dataset.is_empty() && !dataset.has_column(field) {
            return Err(PipelineError::FieldNotFound(field.to_string()));
        }
        Ok(())
    };

    let mut entries = Vec::with_capacity(defs.len());
    for def in defs {
        let value = match def {
            StatDef::Count => StatValue::Count(view.len()),
            StatDef::Mean { field } => {
                check_field(field)?;
                StatValue::Mean(mean_of(view.records().map(|r| r.get(field))))
            }
            StatDef::GroupMean { field, by } => {
                check_field(field)?;
                check_field(by)?;

                let mut sums: BTreeMap<FieldValue, (f64, usize)> = BTreeMap::new();
                for rec in view.records() {
                    let Some(v) = rec.get(field).as_f64() else {
                        continue;
                    };
                    let entry = sums.entry(rec.get(by).clone()).or_insert((0.0, 0));
                    entry.0 += v;
                    entry.1 += 1;
                }
                StatValue::GroupMeans(
                    sums.into_iter()
                        .map(|(key, (sum, n))| (key, sum / n as f64))
                        .collect(),
                )
            }
        };
        entries.push((def.name(), value));
    }
    Ok(SummaryStats { entries })
}

/// Mean over the numeric values in the iterator; `None` when nothing
/// contributes.
fn mean_of<'a>(values: impl Iterator<Item = &'a FieldValue>) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values.filter_map(FieldValue::as_f64) {
        sum += v;
        n += 1;
    }
    if n == 0 { None } else { Some(sum / n as f64) }
}
