//! Progress sources.
//!
//! A source answers one question per kind and per tick: which operations of
//! this kind are running right now?
//!
//! ```text
//!   ┌──────────────┐  fetch(kind)  ┌──────────────────────┐
//!   │  Scheduler   │──────────────►│    ProgressSource     │ (trait)
//!   └──────────────┘               └──────────┬───────────┘
//!                                  ┌──────────┴───────────┐
//!                           ┌──────▼──────────┐   ┌───────▼──────┐
//!                           │PostgresCollector│   │  MockSource  │
//!                           │ pg_stat_progress│   │  (scripted)  │
//!                           └─────────────────┘   └──────────────┘
//! ```
//!
//! A batch reflects the server at one point in time. On error the whole
//! batch is discarded; the scheduler treats it as empty for that tick.

pub mod mock;
mod pg_collector;

use std::fmt;

use crate::models::{ProgressKind, ProgressRecord};

pub use mock::MockSource;
pub use pg_collector::{PgCollectError, PostgresCollector};

/// Fetch contract between the scheduler and a data source.
pub trait ProgressSource {
    /// Returns every running operation of `kind`.
    fn fetch(&mut self, kind: ProgressKind) -> Result<Vec<ProgressRecord>, FetchError>;
}

impl<S: ProgressSource + ?Sized> ProgressSource for Box<S> {
    fn fetch(&mut self, kind: ProgressKind) -> Result<Vec<ProgressRecord>, FetchError> {
        (**self).fetch(kind)
    }
}

/// Error fetching one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Could not reach the server. Retried next tick.
    Connection(String),
    /// The query failed for a reason that may go away. Retried next tick.
    Query(String),
    /// The view is missing, unreadable or returned rows we cannot decode.
    Unavailable(String),
    /// The server is older than the release that introduced the view.
    Unsupported {
        kind: ProgressKind,
        server_version_num: i32,
    },
}

impl FetchError {
    /// Persistent errors disable the kind for the rest of the session.
    pub fn is_persistent(&self) -> bool {
        matches!(
            self,
            FetchError::Unavailable(_) | FetchError::Unsupported { .. }
        )
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Connection(msg) => write!(f, "PostgreSQL: {}", msg),
            FetchError::Query(msg) => write!(f, "query error: {}", msg),
            FetchError::Unavailable(msg) => write!(f, "unavailable: {}", msg),
            FetchError::Unsupported {
                kind,
                server_version_num,
            } => write!(
                f,
                "{} requires PostgreSQL {} (server is {})",
                kind.view_name(),
                format_version(kind.min_server_version()),
                format_version(*server_version_num)
            ),
        }
    }
}

impl std::error::Error for FetchError {}

/// Formats a `server_version_num` for humans: `90600` → `9.6`, `170002` → `17`.
pub fn format_version(version_num: i32) -> String {
    if version_num >= 100000 {
        format!("{}", version_num / 10000)
    } else {
        format!("{}.{}", version_num / 10000, (version_num / 100) % 100)
    }
}
