//! Month and bucket selection over a [`LedgerSnapshot`], with totals.

use ledger_core::models::{Bucket, MonthCode, Transaction};
use serde::Serialize;

use crate::store::LedgerSnapshot;

// ── QueryResult ───────────────────────────────────────────────────────────────

/// Transactions matching one `(bucket, month)` selection, in ingestion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult<'a> {
    pub transactions: Vec<&'a Transaction>,
    /// Sum of `amount` over `transactions`; `0` when there are none.
    pub total: f64,
}

impl QueryResult<'_> {
    pub fn empty() -> Self {
        QueryResult {
            transactions: Vec::new(),
            total: 0.0,
        }
    }

    pub fn count(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Select the transactions of `month` that fall in `bucket` and total them.
///
/// Pure: the same arguments on the same snapshot always give the same result.
pub fn query(snapshot: &LedgerSnapshot, bucket: Bucket, month: MonthCode) -> QueryResult<'_> {
    let transactions: Vec<&Transaction> = snapshot
        .iter()
        .filter(|t| t.month == month)
        .filter(|t| bucket.admits(&t.category))
        .collect();

    let total = sum_amounts(&transactions);

    QueryResult {
        transactions,
        total,
    }
}

// ── MonthSummary ──────────────────────────────────────────────────────────────

/// Total and count for one bucket of a month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketTotal {
    pub bucket: Bucket,
    pub total: f64,
    pub count: usize,
}

/// Per-bucket breakdown of one month. The buckets partition the month, so
/// their totals add up to `total`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    pub month: MonthCode,
    pub total: f64,
    pub count: usize,
    pub buckets: Vec<BucketTotal>,
}

/// Break `month` down into food, pet and other totals.
pub fn summarize(snapshot: &LedgerSnapshot, month: MonthCode) -> MonthSummary {
    let all = query(snapshot, Bucket::All, month);

    let buckets = Bucket::PARTITION
        .iter()
        .map(|&bucket| {
            let members: Vec<&Transaction> = all
                .transactions
                .iter()
                .copied()
                .filter(|t| t.bucket() == bucket)
                .collect();
            BucketTotal {
                bucket,
                total: sum_amounts(&members),
                count: members.len(),
            }
        })
        .collect();

    MonthSummary {
        month,
        total: all.total,
        count: all.count(),
        buckets,
    }
}

// Folds from +0.0 so an empty selection never totals to -0.0.
fn sum_amounts(transactions: &[&Transaction]) -> f64 {
    transactions.iter().fold(0.0, |acc, t| acc + t.amount)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
