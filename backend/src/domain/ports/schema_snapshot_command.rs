//! Driving port for building and loading schema snapshots.

use async_trait::async_trait;

use crate::domain::SchemaSnapshot;

/// Failures of snapshot building and loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// The catalog could not be introspected.
    #[error("database catalog unavailable: {message}")]
    CatalogUnavailable { message: String },
    /// The snapshot could not be written; the previous one is untouched.
    #[error("failed to write schema snapshot: {message}")]
    SnapshotWrite { message: String },
    /// No snapshot has been built yet.
    #[error("schema snapshot missing at {location}; run `schema-snapshot` to build it")]
    SnapshotMissing { location: String },
    /// A snapshot exists but cannot be used.
    #[error("schema snapshot unreadable: {message}")]
    SnapshotCorrupt { message: String },
}

impl SnapshotError {
    /// Stable snake_case identifier used in error details.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CatalogUnavailable { .. } => "catalog_unavailable",
            Self::SnapshotWrite { .. } => "snapshot_write",
            Self::SnapshotMissing { .. } => "snapshot_missing",
            Self::SnapshotCorrupt { .. } => "snapshot_corrupt",
        }
    }
}

/// Summary of a completed snapshot build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotBuild {
    /// Where the snapshot was written.
    pub location: String,
    /// Schema that was introspected.
    pub schema: String,
    /// Number of captured tables.
    pub table_count: usize,
}

/// Build and read the schema snapshot.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaSnapshotCommand: Send + Sync {
    /// Introspect the catalog and replace the stored snapshot.
    ///
    /// `schema` is the explicit schema argument; `None` defers to configuration.
    async fn build(&self, schema: Option<String>) -> Result<SnapshotBuild, SnapshotError>;

    /// Load the stored snapshot.
    async fn load(&self) -> Result<SchemaSnapshot, SnapshotError>;
}
