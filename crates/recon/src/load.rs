//! Record loaders for JSON and CSV inputs.

use std::path::Path;

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::error::{ReconError, Result};
use crate::model::FinancialRecord;
use crate::normalize::record_from_object;

/// Parse records from JSON: a bare array, `{"invoices": [...]}`, or
/// `{"data": {"invoices": [...]}}`.
pub fn parse_records_json(input: &str) -> Result<Vec<FinancialRecord>> {
    let value: Value = serde_json::from_str(input)?;
    let items = record_list(&value).ok_or_else(|| {
        ReconError::RecordShape(
            "expected an array, an object with `invoices`, or `data.invoices`".into(),
        )
    })?;

    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item {
            Value::Object(object) => records.push(record_from_object(object)),
            other => warn!("skipping entry {i}: expected an object, got {}", kind(other)),
        }
    }
    debug!("parsed {} JSON records", records.len());
    Ok(records)
}

fn record_list(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(object) => object
            .get("invoices")
            .or_else(|| object.get("data").and_then(|d| d.get("invoices")))
            .and_then(Value::as_array),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse records from a headered CSV. Blank cells are absent.
pub fn parse_records_csv(input: &str) -> Result<Vec<FinancialRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(input.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let object: Map<String, Value> = headers
            .iter()
            .zip(row.iter())
            .filter(|(_, cell)| !cell.trim().is_empty())
            .map(|(h, cell)| (h.clone(), Value::String(cell.to_string())))
            .collect();
        records.push(record_from_object(&object));
    }
    debug!("parsed {} CSV records", records.len());
    Ok(records)
}

/// Load records from disk; `.csv` files are read as CSV, anything else as JSON.
pub fn load_records(path: &Path) -> Result<Vec<FinancialRecord>> {
    let input = std::fs::read_to_string(path).map_err(|source| ReconError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        parse_records_csv(&input)
    } else {
        parse_records_json(&input)
    }
}
