use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// FieldValue – a single cell of a tabular record
// ---------------------------------------------------------------------------

/// A dynamically-typed scalar value, mirroring what a hosted relational
/// backend hands back per cell. Stored in `BTreeMap` / `BTreeSet` downstream,
/// so `FieldValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date string kept as text for simplicity.
    Date(String),
    Null,
}

// -- Manual Eq/Ord so we can put FieldValue in BTreeSet and use it as a
//    group key --

impl Eq for FieldValue {}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use FieldValue::*;
        fn discriminant(v: &FieldValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for FieldValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FieldValue::String(s) | FieldValue::Date(s) => s.hash(state),
            FieldValue::Integer(i) => i.hash(state),
            FieldValue::Float(f) => f.to_bits().hash(state),
            FieldValue::Bool(b) => b.hash(state),
            FieldValue::Null => {}
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v:.4}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Date(d) => write!(f, "{d}"),
            FieldValue::Null => write!(f, "<null>"),
        }
    }
}

impl FieldValue {
    /// Try to interpret the value as an `f64` for range filters and means.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Whether this cell carries no value.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// A single row: named fields mapped to scalar values. Immutable once
/// loaded; carries no identity beyond its field values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(fields: BTreeMap<String, FieldValue>) -> Self {
        Record { fields }
    }

    /// Look up a field; absent fields read as `Null`.
    pub fn get(&self, field: &str) -> &FieldValue {
        self.fields.get(field).unwrap_or(&FieldValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded snapshot
// ---------------------------------------------------------------------------

/// An ordered collection of records sharing a schema, with a pre-computed
/// column index. Treated as read-only for the lifetime of one snapshot.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All records (rows), in source order.
    pub records: Vec<Record>,
    /// Ordered list of field names across all records.
    pub column_names: Vec<String>,
    /// For each column the sorted set of distinct values, so the widget
    /// layer can enumerate filter choices without rescanning rows.
    pub unique_values: BTreeMap<String, BTreeSet<FieldValue>>,
}

impl Dataset {
    /// Build the column index from loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut column_names_set: BTreeSet<String> = BTreeSet::new();
        let mut unique_values: BTreeMap<String, BTreeSet<FieldValue>> = BTreeMap::new();

        for rec in &records {
            for (col, val) in &rec.fields {
                column_names_set.insert(col.clone());
                unique_values
                    .entry(col.clone())
                    .or_default()
                    .insert(val.clone());
            }
        }
        let column_names: Vec<String> = column_names_set.into_iter().collect();
        Dataset {
            records,
            column_names,
            unique_values,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the schema contains the given column.
    pub fn has_column(&self, name: &str) -> bool {
        self.unique_values.contains_key(name)
    }
}
