use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by Sheet Ledger.
///
/// The normalization and query core never returns these; only record sources
/// and configuration loading do.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A local record file could not be opened or read.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The remote record source could not be reached or answered with an error.
    #[error("Failed to fetch records from {url}: {message}")]
    Fetch { url: String, message: String },

    /// The source answered, but not with a list of records.
    #[error("Unexpected record payload: {0}")]
    UnexpectedShape(String),

    /// A month selection string is not one of `01`..`12`.
    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the ledger crates.
pub type Result<T> = std::result::Result<T, LedgerError>;
