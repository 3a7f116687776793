//! Runtime layer for Sheet Ledger.
//!
//! Drives the one-shot load of a session and exposes its state to callers.

pub mod session;

pub use ledger_core as core;
pub use ledger_data as data;
