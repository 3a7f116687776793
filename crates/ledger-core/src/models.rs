use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};

use crate::classifier;
use crate::error::LedgerError;

/// Default `type` when the record carries none.
pub const DEFAULT_TYPE: &str = "Other";
/// Default `description` when the record carries none.
pub const DEFAULT_DESCRIPTION: &str = "No description";
/// Default `category` when the record carries none.
pub const DEFAULT_CATEGORY: &str = "Other";

const MONTH_CODES: [&str; 13] = [
    "00", "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12",
];

// ── MonthCode ─────────────────────────────────────────────────────────────────

/// Two-digit month code, `"01"`–`"12"`, or `"00"` for an unknown month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthCode(u8);

impl MonthCode {
    /// Sentinel for records whose month could not be read.
    pub const UNKNOWN: MonthCode = MonthCode(0);

    /// Build a code for calendar month `month` (1-12).
    pub fn new(month: u8) -> Option<Self> {
        (1..=12).contains(&month).then_some(MonthCode(month))
    }

    /// Read a spreadsheet month label such as `"3"`, `"03"` or `"3월"`.
    ///
    /// A trailing non-digit unit marker is stripped and the remaining one or
    /// two digits are zero-padded. Anything else, including months outside
    /// 1-12, gives [`MonthCode::UNKNOWN`].
    pub fn from_label(label: &str) -> Self {
        static LABEL: OnceLock<Regex> = OnceLock::new();
        let re = LABEL.get_or_init(|| Regex::new(r"^(\d{1,2})\D*$").expect("regex is valid"));

        re.captures(label.trim())
            .and_then(|caps| caps[1].parse::<u8>().ok())
            .and_then(MonthCode::new)
            .unwrap_or(MonthCode::UNKNOWN)
    }

    /// The twelve selectable months in calendar order.
    pub fn all() -> impl Iterator<Item = MonthCode> {
        (1..=12).map(MonthCode)
    }

    pub fn as_str(&self) -> &'static str {
        MONTH_CODES[self.0 as usize]
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == 0
    }

    /// Display label used by the month selector, e.g. `"03월"`.
    pub fn label(&self) -> String {
        format!("{}월", self.as_str())
    }
}

impl fmt::Display for MonthCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a month *selection*: unlike [`MonthCode::from_label`], the unknown
/// sentinel is rejected.
impl FromStr for MonthCode {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = MonthCode::from_label(s);
        if code.is_unknown() {
            return Err(LedgerError::InvalidMonth(s.to_string()));
        }
        Ok(code)
    }
}

impl Serialize for MonthCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ── Bucket ────────────────────────────────────────────────────────────────────

/// Category grouping used to narrow one month's transactions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    /// Every transaction of the month.
    #[default]
    All,
    /// Groceries and dining.
    Food,
    /// Pet expenses.
    Pet,
    /// Everything that is neither food nor pet.
    Other,
}

impl Bucket {
    /// The three buckets that partition a month; `All` is their union.
    pub const PARTITION: [Bucket; 3] = [Bucket::Food, Bucket::Pet, Bucket::Other];

    /// `true` when a transaction with `category` belongs in this bucket.
    pub fn admits(&self, category: &str) -> bool {
        match self {
            Bucket::All => true,
            narrow => classifier::bucket_for(category) == *narrow,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::All => "all",
            Bucket::Food => "food",
            Bucket::Pet => "pet",
            Bucket::Other => "other",
        }
    }

    /// Tab label used by the budget book.
    pub fn title(&self) -> &'static str {
        match self {
            Bucket::All => "전체",
            Bucket::Food => "식비",
            Bucket::Pet => "호두",
            Bucket::Other => "기타",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Transaction ───────────────────────────────────────────────────────────────

/// One normalized ledger entry.
///
/// Only the normalizer creates these; once in a snapshot they are never
/// modified.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Position in the source sequence, starting at 0.
    pub id: usize,
    pub month: MonthCode,
    /// Free-text classification from the sheet's type column.
    #[serde(rename = "type")]
    pub kind: String,
    /// Month-day portion of the date (`"03-15"`) or empty.
    pub date: String,
    pub description: String,
    pub category: String,
    /// Finite and never negative.
    pub amount: f64,
    pub payment_method: String,
}

impl Transaction {
    /// The bucket this transaction is counted under.
    pub fn bucket(&self) -> Bucket {
        classifier::bucket_for(&self.category)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_from_label_strips_unit_suffix() {
        assert_eq!(MonthCode::from_label("03월").as_str(), "03");
        assert_eq!(MonthCode::from_label("3월").as_str(), "03");
        assert_eq!(MonthCode::from_label("12월").as_str(), "12");
    }

    #[test]
    fn test_month_from_label_pads_plain_digits() {
        assert_eq!(MonthCode::from_label("7").as_str(), "07");
        assert_eq!(MonthCode::from_label(" 11 ").as_str(), "11");
        assert_eq!(MonthCode::from_label("01").as_str(), "01");
    }

    #[test]
    fn test_month_from_label_unreadable_is_unknown() {
        for label in ["", "월", "March", "2026-03", "13", "0", "123"] {
            let code = MonthCode::from_label(label);
            assert!(code.is_unknown(), "label {label:?} gave {code}");
            assert_eq!(code.as_str(), "00");
        }
    }

    #[test]
    fn test_month_codes_are_always_two_digits() {
        for code in MonthCode::all().chain(std::iter::once(MonthCode::UNKNOWN)) {
            let s = code.as_str();
            assert_eq!(s.len(), 2);
            assert!(s.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_month_all_in_calendar_order() {
        let codes: Vec<&str> = MonthCode::all().map(|m| m.as_str()).collect();
        assert_eq!(codes.len(), 12);
        assert_eq!(codes.first(), Some(&"01"));
        assert_eq!(codes.last(), Some(&"12"));
    }

    #[test]
    fn test_month_from_str_rejects_unknown() {
        assert!("00".parse::<MonthCode>().is_err());
        assert!("abc".parse::<MonthCode>().is_err());
        assert_eq!("3".parse::<MonthCode>().unwrap().as_str(), "03");
    }

    #[test]
    fn test_month_label() {
        assert_eq!(MonthCode::new(3).unwrap().label(), "03월");
        assert!(MonthCode::new(0).is_none());
        assert!(MonthCode::new(13).is_none());
    }

    #[test]
    fn test_month_serializes_as_code_string() {
        let json = serde_json::to_string(&MonthCode::new(4).unwrap()).unwrap();
        assert_eq!(json, "\"04\"");
    }

    #[test]
    fn test_bucket_admits() {
        assert!(Bucket::All.admits("anything"));
        assert!(Bucket::Food.admits("Dining"));
        assert!(Bucket::Food.admits("Groceries - Costco"));
        assert!(Bucket::Pet.admits("Pet Supplies"));
        assert!(Bucket::Other.admits("Gas"));
        assert!(!Bucket::Other.admits("Dining"));
        assert!(!Bucket::Food.admits("dining"));
    }

    #[test]
    fn test_transaction_serializes_wire_names() {
        let tx = Transaction {
            id: 0,
            month: MonthCode::new(3).unwrap(),
            kind: "Food".to_string(),
            date: "03-15".to_string(),
            description: "Coffee".to_string(),
            category: "Dining".to_string(),
            amount: 4.5,
            payment_method: "Card".to_string(),
        };
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["month"], "03");
        assert_eq!(value["type"], "Food");
        assert_eq!(value["paymentMethod"], "Card");
        assert_eq!(value["amount"], 4.5);
        assert_eq!(tx.bucket(), Bucket::Food);
    }
}
