//! Conversion of loosely-typed sheet rows into [`Transaction`]s.
//!
//! Every field is read and defaulted on its own; a broken field never spoils
//! the rest of the row, and no row is ever rejected.

use std::sync::OnceLock;

use ledger_core::models::{
    MonthCode, Transaction, DEFAULT_CATEGORY, DEFAULT_DESCRIPTION, DEFAULT_TYPE,
};
use regex::Regex;
use serde_json::Value;
use tracing::debug;

// ── FieldKeys ─────────────────────────────────────────────────────────────────

/// Column headers the sheet uses for each transaction field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKeys {
    pub month: String,
    pub kind: String,
    pub date: String,
    pub description: String,
    pub category: String,
    pub amount: String,
    pub payment_method: String,
}

impl Default for FieldKeys {
    /// Headers of the household budget sheet.
    fn default() -> Self {
        Self {
            month: "month".to_string(),
            kind: "구분".to_string(),
            date: "일자".to_string(),
            description: "내용".to_string(),
            category: "분류".to_string(),
            amount: "금액".to_string(),
            payment_method: "지출방식".to_string(),
        }
    }
}

// ── Normalizer ────────────────────────────────────────────────────────────────

/// Maps raw records to transactions using a fixed set of column headers.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    keys: FieldKeys,
}

impl Normalizer {
    pub fn new(keys: FieldKeys) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &FieldKeys {
        &self.keys
    }

    /// Build the transaction for `record`, which sits at position `index` of
    /// the source sequence. Never fails: records that are not JSON objects
    /// come out with every field defaulted.
    pub fn normalize(&self, record: &Value, index: usize) -> Transaction {
        let keys = &self.keys;

        Transaction {
            id: index,
            month: month_field(record.get(&keys.month)),
            kind: text_field(record, &keys.kind).unwrap_or_else(|| DEFAULT_TYPE.to_string()),
            date: text_field(record, &keys.date)
                .map(|raw| short_date(&raw))
                .unwrap_or_default(),
            description: non_empty_text(record, &keys.description)
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            category: non_empty_text(record, &keys.category)
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            amount: record
                .get(&keys.amount)
                .map(|v| coerce_amount(v, index))
                .unwrap_or(0.0),
            payment_method: text_field(record, &keys.payment_method).unwrap_or_default(),
        }
    }
}

/// Normalize one record with the default sheet headers.
pub fn normalize(record: &Value, index: usize) -> Transaction {
    Normalizer::default().normalize(record, index)
}

// ── Field readers ─────────────────────────────────────────────────────────────

/// Text form of a scalar field. `null`, arrays, objects and missing keys are
/// all treated as absent.
fn text_field(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn non_empty_text(record: &Value, key: &str) -> Option<String> {
    text_field(record, key).filter(|s| !s.is_empty())
}

/// Month label → code. Sheets may hand back `3` as a number or `"3월"` as text.
fn month_field(value: Option<&Value>) -> MonthCode {
    match value {
        Some(Value::String(s)) => MonthCode::from_label(s),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|m| u8::try_from(m).ok())
            .and_then(MonthCode::new)
            .unwrap_or(MonthCode::UNKNOWN),
        _ => MonthCode::UNKNOWN,
    }
}

/// Month-day portion (`"03-15"`) of an ISO-style date such as `"2026-03-15"`
/// or `"2026-03-15T00:00:00.000Z"`. Anything else gives an empty string.
fn short_date(raw: &str) -> String {
    static ISO_DATE: OnceLock<Regex> = OnceLock::new();
    let re = ISO_DATE.get_or_init(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("regex is valid"));

    if !re.is_match(raw) {
        return String::new();
    }
    raw.get(5..10).unwrap_or_default().to_string()
}

/// Numeric value of an amount cell, or `0` when it has none.
///
/// Numbers pass through, strings are parsed after trimming (an empty string
/// is `0`), booleans count as `1`/`0`. Results that are not finite or are
/// negative become `0`.
fn coerce_amount(value: &Value, index: usize) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::Array(_) | Value::Object(_) => None,
    };

    match parsed {
        Some(amount) if amount.is_finite() && amount > 0.0 => amount,
        Some(amount) if amount == 0.0 => 0.0,
        other => {
            debug!(record = index, raw = %value, parsed = ?other, "amount defaulted to 0");
            0.0
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
