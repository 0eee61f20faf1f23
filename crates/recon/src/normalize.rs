//! Field canonicalization shared by both matchers and the record loaders.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::model::{ExtractionStatus, FinancialRecord, MatchKey, DEFAULT_DOCUMENT_TYPE};

/// Date layouts accepted on either side, tried in order.
pub const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%Y/%m/%d"];

/// Trim + uppercase. Absent and blank both become `""`.
pub fn normalize_string(value: Option<&str>) -> String {
    value.map(|v| v.trim().to_uppercase()).unwrap_or_default()
}

/// Deterministic identity of a record.
pub fn match_key(record: &FinancialRecord) -> MatchKey {
    MatchKey {
        supplier_id: normalize_string(record.supplier_id.as_deref()),
        invoice_number: normalize_string(Some(&record.invoice_number)),
        document_type: normalize_string(Some(&record.document_type)),
    }
}

/// Best-effort numeric extraction from text. `None` when unparsable.
pub fn parse_amount_str(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('₹').unwrap_or(trimmed).trim_start();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric extraction from a JSON value: numbers and numeric strings.
pub fn parse_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_amount_str(s),
        _ => None,
    }
}

/// Parse a date in any of [`DATE_FORMATS`]. Unparsable means unknown.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

pub fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().and_then(|i| match i {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Text form of a scalar JSON value; blank strings are absent.
pub fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| object.get(*k))
        .find(|v| !v.is_null() && !matches!(v, Value::String(s) if s.trim().is_empty()))
}

fn text_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    first(object, keys).and_then(text_value)
}

fn amount_field(object: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    first(object, keys).and_then(parse_amount)
}

/// Build a record from a loosely-shaped JSON object, accepting the key
/// aliases used by extractors and GSTR-2B exports.
pub fn record_from_object(object: &Map<String, Value>) -> FinancialRecord {
    let extraction_status = match text_field(object, &["extraction_status", "status"]) {
        Some(s) if s.trim().eq_ignore_ascii_case("error") => ExtractionStatus::Error,
        _ => ExtractionStatus::Ok,
    };

    FinancialRecord {
        invoice_number: text_field(object, &["invoice_number", "inv_no"]).unwrap_or_default(),
        invoice_date: text_field(object, &["invoice_date", "inv_dt"]),
        supplier_id: text_field(object, &["supplier_gstin", "gstin", "supplier_id"]),
        document_type: text_field(object, &["document_type"])
            .unwrap_or_else(|| DEFAULT_DOCUMENT_TYPE.to_string()),
        taxable_value: amount_field(object, &["taxable_value"]),
        cgst: amount_field(object, &["cgst"]),
        sgst: amount_field(object, &["sgst"]),
        igst: amount_field(object, &["igst"]),
        total_amount: amount_field(object, &["total_amount", "total_amt"]),
        extraction_status,
        section: text_field(object, &["section", "gstr2b_section"]),
        itc_eligible: first(object, &["itc_eligible", "itc_eligibility"]).and_then(parse_bool),
    }
}
