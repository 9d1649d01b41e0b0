//! Driving port for report SQL generation and execution.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::sql_guard::{ReadOnlySelect, SqlGuardError};

use super::SnapshotError;

/// Where the report statement comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSource {
    /// Free text translated by the completion service.
    NaturalLanguage(String),
    /// Caller-supplied SQL, subject to the same guard as generated SQL.
    Sql(String),
}

/// Failures turning a report source into a safe statement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslationError {
    /// The request text is empty.
    #[error("report request must not be empty")]
    EmptyRequest,
    /// The schema snapshot is missing or unreadable.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    /// The completion service failed or timed out.
    #[error("completion service unavailable: {message}")]
    UpstreamUnavailable { message: String },
    /// The statement failed the SQL guard.
    #[error("statement rejected: {0}")]
    Rejected(#[from] SqlGuardError),
}

impl TranslationError {
    /// Stable snake_case identifier used in error details.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::EmptyRequest => "empty_request",
            Self::Snapshot(inner) => inner.kind(),
            Self::UpstreamUnavailable { .. } => "upstream_unavailable",
            Self::Rejected(inner) => inner.kind(),
        }
    }
}

/// Failures running a report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    /// The statement could not be produced.
    #[error(transparent)]
    Translation(#[from] TranslationError),
    /// The database could not be reached.
    #[error("report database unavailable: {message}")]
    Unavailable { message: String },
    /// The database failed the statement.
    #[error("report execution failed: {message}")]
    Execution { message: String },
}

/// Rows produced by a report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRows {
    /// Statement that was executed.
    pub statement: ReadOnlySelect,
    /// One JSON object per row.
    pub rows: Vec<Value>,
}

/// Produce and run guarded report statements.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportCommand: Send + Sync {
    /// Translate natural language into a guarded SELECT.
    async fn translate(&self, request: &str) -> Result<ReadOnlySelect, TranslationError>;

    /// Produce a guarded statement from either source.
    async fn prepare(&self, source: ReportSource) -> Result<ReadOnlySelect, TranslationError>;

    /// Produce a guarded statement and execute it read-only.
    async fn run(&self, source: ReportSource) -> Result<ReportRows, ReportError>;
}
