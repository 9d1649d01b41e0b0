//! File-backed [`SnapshotStore`].
//!
//! Snapshots are written to a uniquely named sibling file and renamed over the
//! target, so readers observe the previous snapshot or the new one and never a
//! partial file. Directory access goes through `cap-std` on tokio's blocking
//! pool.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tokio::task;
use tracing::debug;
use uuid::Uuid;

use crate::domain::SchemaSnapshot;
use crate::domain::ports::{SnapshotStore, SnapshotStoreError};

/// Default location relative to the working directory.
pub const DEFAULT_SNAPSHOT_PATH: &str = "storage/schema_snapshot.json";

/// Stores the snapshot as pretty-printed JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl Default for FileSnapshotStore {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_PATH)
    }
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn file_name(&self) -> Result<&Path, String> {
        self.path
            .file_name()
            .map(Path::new)
            .ok_or_else(|| "snapshot path has no file name".to_owned())
    }

    fn write_error(&self, message: impl Into<String>) -> SnapshotStoreError {
        SnapshotStoreError::write(self.location(), message)
    }

    fn write_blocking(&self, body: &[u8]) -> Result<String, SnapshotStoreError> {
        let file_name = self.file_name().map_err(|msg| self.write_error(msg))?;
        let parent = self.parent_dir();
        Dir::create_ambient_dir_all(parent, ambient_authority())
            .map_err(|err| self.write_error(err.to_string()))?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority())
            .map_err(|err| self.write_error(err.to_string()))?;

        let staged = PathBuf::from(format!(".tmp-schema-snapshot-{}", Uuid::new_v4().simple()));
        if let Err(err) = dir.write(&staged, body) {
            let _cleanup = dir.remove_file(&staged);
            return Err(self.write_error(err.to_string()));
        }
        if let Err(err) = dir.rename(&staged, &dir, file_name) {
            let _cleanup = dir.remove_file(&staged);
            return Err(self.write_error(err.to_string()));
        }

        debug!(path = %self.location(), bytes = body.len(), "schema snapshot written");
        Ok(self.location())
    }

    fn read_blocking(&self) -> Result<Option<SchemaSnapshot>, SnapshotStoreError> {
        let file_name = self
            .file_name()
            .map_err(|msg| SnapshotStoreError::read(self.location(), msg))?;
        let dir = match Dir::open_ambient_dir(self.parent_dir(), ambient_authority()) {
            Ok(dir) => dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(SnapshotStoreError::read(self.location(), err.to_string())),
        };
        let raw = match dir.read(file_name) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(SnapshotStoreError::read(self.location(), err.to_string())),
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|err| SnapshotStoreError::corrupt(self.location(), err.to_string()))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn write(&self, snapshot: &SchemaSnapshot) -> Result<String, SnapshotStoreError> {
        let mut body = serde_json::to_vec_pretty(snapshot)
            .map_err(|err| self.write_error(err.to_string()))?;
        body.push(b'\n');

        let store = self.clone();
        task::spawn_blocking(move || store.write_blocking(&body))
            .await
            .map_err(|err| self.write_error(err.to_string()))?
    }

    async fn read(&self) -> Result<Option<SchemaSnapshot>, SnapshotStoreError> {
        let store = self.clone();
        task::spawn_blocking(move || store.read_blocking())
            .await
            .map_err(|err| SnapshotStoreError::read(self.location(), err.to_string()))?
    }
}
