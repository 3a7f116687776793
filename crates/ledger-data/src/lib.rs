//! Data layer for Sheet Ledger.
//!
//! Fetches raw sheet rows, normalizes them into transactions, holds them in
//! an immutable snapshot and answers month/bucket queries over it.

pub mod normalizer;
pub mod query;
pub mod source;
pub mod store;

pub use ledger_core as core;
