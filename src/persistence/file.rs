//! JSON file backend.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::models::PoolDocument;
use super::{PoolStore, StoredState};
use crate::domain::PoolState;
use crate::error::StoreError;

/// Stores the pool document as pretty-printed JSON at a fixed path.
///
/// Writes go to a sibling `*.tmp` file which is then renamed over the
/// target, so readers see either the old or the new document in full.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Creates a store backed by the file at `path`. The file is not touched
    /// until the first read.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `state` as a fresh document at version 0, replacing anything
    /// already there. Used for out-of-band seeding.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on I/O failure.
    pub async fn seed(&self, state: &PoolState) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.replace(&PoolDocument::from_state(state, 0)).await
    }

    async fn load(&self) -> Result<PoolDocument, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotSeeded(self.path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn replace(&self, doc: &PoolDocument) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(doc)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl PoolStore for JsonFileStore {
    async fn read(&self) -> Result<StoredState, StoreError> {
        let doc = self.load().await?;
        let version = doc.version;
        let state = doc.into_state()?;
        Ok(StoredState { state, version })
    }

    async fn write(&self, state: &PoolState, expected_version: u64) -> Result<u64, StoreError> {
        let _guard = self.write_lock.lock().await;

        let found = self.load().await?.version;
        if found != expected_version {
            return Err(StoreError::VersionConflict {
                expected: expected_version,
                found,
            });
        }

        let next = expected_version.saturating_add(1);
        self.replace(&PoolDocument::from_state(state, next)).await?;
        tracing::debug!(path = %self.path.display(), version = next, "pool document written");
        Ok(next)
    }

    fn describe(&self) -> &'static str {
        "json-file"
    }
}
