//! The session's immutable sequence of normalized transactions.

use std::collections::BTreeSet;

use ledger_core::models::{MonthCode, Transaction};
use serde_json::Value;
use tracing::debug;

use crate::normalizer::Normalizer;

/// Ordered, read-only set of transactions loaded for one session.
///
/// A snapshot is built once from the raw records and replaced as a whole on
/// reload; there is no API to add, remove or edit entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerSnapshot {
    transactions: Vec<Transaction>,
}

impl LedgerSnapshot {
    /// Normalize `records` in order with the default sheet headers.
    pub fn load(records: &[Value]) -> Self {
        Self::load_with(&Normalizer::default(), records)
    }

    /// Normalize `records` in order; record `i` becomes transaction id `i`.
    pub fn load_with(normalizer: &Normalizer, records: &[Value]) -> Self {
        let transactions: Vec<Transaction> = records
            .iter()
            .enumerate()
            .map(|(index, record)| normalizer.normalize(record, index))
            .collect();

        debug!(transactions = transactions.len(), "ledger snapshot loaded");

        Self { transactions }
    }

    /// A snapshot with no transactions.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Distinct month codes present, ascending. May include the unknown code.
    pub fn months(&self) -> Vec<MonthCode> {
        self.transactions
            .iter()
            .map(|t| t.month)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl<'a> IntoIterator for &'a LedgerSnapshot {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_preserves_order_and_assigns_ids() {
        let records = vec![
            json!({"month": "1월", "내용": "first"}),
            json!({"month": "2월", "내용": "second"}),
            json!("garbage"),
            json!({"month": "1월", "내용": "fourth"}),
        ];
        let snapshot = LedgerSnapshot::load(&records);

        assert_eq!(snapshot.len(), 4);
        let ids: Vec<usize> = snapshot.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(snapshot.transactions()[0].description, "first");
        assert_eq!(snapshot.transactions()[3].description, "fourth");
    }

    #[test]
    fn test_load_empty_input_is_empty_snapshot() {
        let snapshot = LedgerSnapshot::load(&[]);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot, LedgerSnapshot::empty());
        assert!(snapshot.months().is_empty());
    }

    #[test]
    fn test_months_are_distinct_and_sorted() {
        let records = vec![
            json!({"month": "3월"}),
            json!({"month": "1월"}),
            json!({"month": "3월"}),
            json!({}),
        ];
        let months: Vec<&str> = LedgerSnapshot::load(&records)
            .months()
            .iter()
            .map(|m| m.as_str())
            .collect();
        assert_eq!(months, vec!["00", "01", "03"]);
    }

    #[test]
    fn test_non_ascii_digit_date_keeps_other_records() {
        let records = vec![
            json!({"month": "3월", "금액": 5}),
            json!({"일자": "٢٠٢٦-٠٣-١٥"}),
        ];
        let snapshot = LedgerSnapshot::load(&records);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.transactions()[0].amount, 5.0);
        assert_eq!(snapshot.transactions()[1].date, "");
    }

    #[test]
    fn test_snapshot_iterates_by_reference() {
        let snapshot = LedgerSnapshot::load(&[json!({"금액": 2}), json!({"금액": 3})]);
        let mut total = 0.0;
        for tx in &snapshot {
            total += tx.amount;
        }
        assert_eq!(total, 5.0);
    }
}
