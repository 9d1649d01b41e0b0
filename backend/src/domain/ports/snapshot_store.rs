//! Port for durable schema snapshot storage.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::SchemaSnapshot;

use super::define_port_error;

define_port_error! {
    /// Errors raised by snapshot storage.
    pub enum SnapshotStoreError {
        /// The snapshot could not be persisted.
        Write { location: String, message: String } =>
            "failed to write snapshot at {location}: {message}",
        /// The snapshot exists but could not be read.
        Read { location: String, message: String } =>
            "failed to read snapshot at {location}: {message}",
        /// The snapshot exists but is not valid JSON for the expected shape.
        Corrupt { location: String, message: String } =>
            "snapshot at {location} is corrupt: {message}",
    }
}

/// Durable storage holding at most one snapshot.
///
/// Writes replace the previous snapshot atomically; readers observe either the
/// old or the new snapshot, never a partial file.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Human-readable location of the snapshot (a path for file stores).
    fn location(&self) -> String;

    /// Replace the stored snapshot and return its location.
    async fn write(&self, snapshot: &SchemaSnapshot) -> Result<String, SnapshotStoreError>;

    /// Load the stored snapshot, or `None` when none was written yet.
    async fn read(&self) -> Result<Option<SchemaSnapshot>, SnapshotStoreError>;
}

/// Process-local store used by tests and by servers without storage access.
#[derive(Debug, Default)]
pub struct FixtureSnapshotStore {
    snapshot: Mutex<Option<SchemaSnapshot>>,
}

impl FixtureSnapshotStore {
    /// Store pre-loaded with `snapshot`.
    #[must_use]
    pub fn with_snapshot(snapshot: SchemaSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
        }
    }
}

#[async_trait]
impl SnapshotStore for FixtureSnapshotStore {
    fn location(&self) -> String {
        "memory://schema_snapshot.json".to_owned()
    }

    async fn write(&self, snapshot: &SchemaSnapshot) -> Result<String, SnapshotStoreError> {
        *self.snapshot.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
        Ok(self.location())
    }

    async fn read(&self) -> Result<Option<SchemaSnapshot>, SnapshotStoreError> {
        Ok(self
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
