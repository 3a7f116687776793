//! One-shot session lifecycle.
//!
//! A [`Session`] starts in [`SessionState::Loading`], fetches its raw records
//! once in a background tokio task and moves to [`SessionState::Ready`]. The
//! move happens exactly once: the task owns the only sender and gives it up
//! with the transition. There is no retry and no cancellation; a source that
//! fails or times out leaves the session ready but empty.

use std::fmt;
use std::sync::Arc;

use ledger_core::models::{Bucket, MonthCode};
use ledger_data::query::{self, MonthSummary, QueryResult};
use ledger_data::source::RawRecordSource;
use ledger_data::store::LedgerSnapshot;
use tokio::sync::watch;
use tracing::{info, warn};

// ── Public types ──────────────────────────────────────────────────────────────

/// Why a ready session holds no ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    /// No source URL or file was configured.
    NotConfigured,
    /// The source answered with zero records.
    NoRecords,
    /// The source could not be read.
    SourceFailed(String),
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyReason::NotConfigured => f.write_str("no record source configured"),
            EmptyReason::NoRecords => f.write_str("the source returned no records"),
            EmptyReason::SourceFailed(message) => write!(f, "loading failed: {message}"),
        }
    }
}

/// Content of a ready session.
#[derive(Debug, Clone)]
pub enum SessionData {
    /// A non-empty ledger.
    Loaded(Arc<LedgerSnapshot>),
    Empty(EmptyReason),
}

impl SessionData {
    pub fn snapshot(&self) -> Option<&LedgerSnapshot> {
        match self {
            SessionData::Loaded(snapshot) => Some(snapshot.as_ref()),
            SessionData::Empty(_) => None,
        }
    }
}

/// Lifecycle phase of a session.
#[derive(Debug, Clone)]
pub enum SessionState {
    Loading,
    Ready(SessionData),
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::Ready(_))
    }

    pub fn snapshot(&self) -> Option<&LedgerSnapshot> {
        match self {
            SessionState::Ready(data) => data.snapshot(),
            SessionState::Loading => None,
        }
    }

    /// Query the ledger. While loading, or when empty, every selection
    /// answers with no transactions and a zero total.
    pub fn query(&self, bucket: Bucket, month: MonthCode) -> QueryResult<'_> {
        match self.snapshot() {
            Some(snapshot) => query::query(snapshot, bucket, month),
            None => QueryResult::empty(),
        }
    }

    pub fn summarize(&self, month: MonthCode) -> MonthSummary {
        let empty = LedgerSnapshot::empty();
        query::summarize(self.snapshot().unwrap_or(&empty), month)
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// Handle on a loading or loaded session.
///
/// Cloning shares the same underlying session.
#[derive(Clone)]
pub struct Session {
    state: watch::Receiver<SessionState>,
}

impl Session {
    /// Start loading from `source` in a background task.
    ///
    /// `None` means nothing was configured; the session still goes through
    /// `Loading` and becomes ready and empty.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(source: Option<Box<dyn RawRecordSource>>) -> Self {
        let (tx, rx) = watch::channel(SessionState::Loading);

        tokio::spawn(async move {
            let data = load_once(source.as_deref()).await;
            // Sending consumes the only sender: no second transition exists.
            tx.send_replace(SessionState::Ready(data));
        });

        Self { state: rx }
    }

    /// Current state without waiting.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Wait for the transition to `Ready` and return its content.
    pub async fn ready(&mut self) -> SessionData {
        match self.state.wait_for(SessionState::is_ready).await {
            Ok(state) => match &*state {
                SessionState::Ready(data) => data.clone(),
                SessionState::Loading => unreachable!("wait_for only returns ready states"),
            },
            Err(_) => {
                warn!("session loader stopped before reporting a result");
                SessionData::Empty(EmptyReason::SourceFailed("loader task ended".to_string()))
            }
        }
    }
}

/// Fetch and normalize once. Every failure becomes an empty result.
pub async fn load_once(source: Option<&dyn RawRecordSource>) -> SessionData {
    let Some(source) = source else {
        warn!("no record source configured; session is empty");
        return SessionData::Empty(EmptyReason::NotConfigured);
    };

    info!(source = %source.describe(), "loading ledger records");

    match source.fetch().await {
        Ok(records) if records.is_empty() => {
            info!("record source returned no records");
            SessionData::Empty(EmptyReason::NoRecords)
        }
        Ok(records) => {
            let snapshot = LedgerSnapshot::load(&records);
            info!(transactions = snapshot.len(), "ledger ready");
            SessionData::Loaded(Arc::new(snapshot))
        }
        Err(e) => {
            warn!(error = %e, "failed to load ledger records");
            SessionData::Empty(EmptyReason::SourceFailed(e.to_string()))
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
