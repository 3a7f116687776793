//! Core types for Sheet Ledger.
//!
//! Holds the canonical transaction model, the category rule table shared by
//! filtering and display, the error type, CLI settings and the number
//! formatting helpers used by the report printer.

pub mod classifier;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
