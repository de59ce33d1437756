use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value as JsonValue;

use super::model::{Dataset, FieldValue, Record};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset snapshot from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.json` – records-oriented array, `[{"field": value, ...}, ...]`,
///   the shape a REST data backend returns for a table select
/// * `.csv`  – header row of field names, one scalar cell per field
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "species": "setosa", "petal_length": 1.4, "sepal_length": 5.1 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json_records(&text)
}

/// Parse a records-oriented JSON string into a dataset. Exposed separately
/// so a connector that already holds a response body can skip the file.
pub fn parse_json_records(text: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut fields = BTreeMap::new();
        for (key, val) in obj {
            fields.insert(key.clone(), json_to_field(val));
        }
        records.push(Record::new(fields));
    }

    Ok(Dataset::from_records(records))
}

fn json_to_field(val: &JsonValue) -> FieldValue {
    match val {
        JsonValue::String(s) => FieldValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                FieldValue::Float(f)
            } else {
                FieldValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => FieldValue::Bool(*b),
        JsonValue::Null => FieldValue::Null,
        other => FieldValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with field names, one scalar value per cell.
/// Cell types are guessed per value (int → float → bool → date → string);
/// empty cells become `Null`.
fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;

        let mut fields = BTreeMap::new();
        for (col_idx, value) in row.iter().enumerate() {
            let Some(name) = headers.get(col_idx) else {
                bail!("CSV row {row_no} has more cells than the header");
            };
            fields.insert(name.clone(), guess_field_type(value));
        }
        records.push(Record::new(fields));
    }

    Ok(Dataset::from_records(records))
}

fn guess_field_type(s: &str) -> FieldValue {
    if s.is_empty() {
        return FieldValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return FieldValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return FieldValue::Float(f);
    }
    if s == "true" || s == "false" {
        return FieldValue::Bool(s == "true");
    }
    if looks_like_date(s) {
        return FieldValue::Date(s.to_string());
    }
    FieldValue::String(s.to_string())
}

/// `YYYY-MM-DD` prefix check, enough to tag backend date columns without
/// pulling in a date-time parser.
fn looks_like_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 10
        && b[..4].iter().all(u8::is_ascii_digit)
        && b[4] == b'-'
        && b[5..7].iter().all(u8::is_ascii_digit)
        && b[7] == b'-'
        && b[8..10].iter().all(u8::is_ascii_digit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn json_records_round_trip() {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .unwrap();
        write!(
            file,
            r#"[
                {{"species": "setosa", "petal_length": 1.4, "tagged": true}},
                {{"species": "virginica", "petal_length": 5.1, "tagged": null}}
            ]"#
        )
        .unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(
            ds.records[0].get("species"),
            &FieldValue::String("setosa".into())
        );
        assert_eq!(ds.records[0].get("petal_length"), &FieldValue::Float(1.4));
        assert_eq!(ds.records[0].get("tagged"), &FieldValue::Bool(true));
        assert_eq!(ds.records[1].get("tagged"), &FieldValue::Null);
    }

    #[test]
    fn json_integers_stay_integers() {
        let ds = parse_json_records(r#"[{"pclass": 1, "fare": 71.28}]"#).unwrap();
        assert_eq!(ds.records[0].get("pclass"), &FieldValue::Integer(1));
        assert_eq!(ds.records[0].get("fare"), &FieldValue::Float(71.28));
    }

    #[test]
    fn json_rejects_non_array_root() {
        assert!(parse_json_records(r#"{"species": "setosa"}"#).is_err());
    }

    #[test]
    fn csv_cells_are_type_guessed() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "name,age,fare,alive,embarked,note").unwrap();
        writeln!(file, "Allen,29,71.2833,true,2026-04-01,").unwrap();
        file.flush().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
        let rec = &ds.records[0];
        assert_eq!(rec.get("name"), &FieldValue::String("Allen".into()));
        assert_eq!(rec.get("age"), &FieldValue::Integer(29));
        assert_eq!(rec.get("fare"), &FieldValue::Float(71.2833));
        assert_eq!(rec.get("alive"), &FieldValue::Bool(true));
        assert_eq!(rec.get("embarked"), &FieldValue::Date("2026-04-01".into()));
        assert_eq!(rec.get("note"), &FieldValue::Null);
    }

    #[test]
    fn unsupported_extension_fails() {
        assert!(load_file(Path::new("snapshot.parquet")).is_err());
    }
}
