//! Persistence layer: whole-document storage of the pool state.
//!
//! Provides the [`PoolStore`] trait and two backends: a JSON file on disk
//! ([`file::JsonFileStore`]) and a single-row JSONB document in PostgreSQL
//! ([`postgres::PostgresStore`]). Both read and write the complete
//! [`PoolState`]; there is no partial update.

pub mod file;
pub mod models;
pub mod postgres;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{DrawConfig, StoreBackend};
use crate::domain::PoolState;
use crate::error::StoreError;

pub use file::JsonFileStore;
pub use postgres::PostgresStore;

/// Pool state together with the version it was read at.
#[derive(Debug, Clone)]
pub struct StoredState {
    /// The decoded, validated state.
    pub state: PoolState,
    /// Version to pass back to [`PoolStore::write`].
    pub version: u64,
}

/// Durable storage for the single pool document.
///
/// Implementations must make `write` all-or-nothing and must reject a write
/// whose `expected_version` is not the version currently stored.
#[async_trait]
pub trait PoolStore: Send + Sync + std::fmt::Debug {
    /// Reads the full document.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the document is missing, unreadable, or
    /// violates the pool invariants.
    async fn read(&self) -> Result<StoredState, StoreError>;

    /// Replaces the full document and returns the new version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VersionConflict`] if the document changed since
    /// `expected_version` was read, or another [`StoreError`] on I/O
    /// failure.
    async fn write(&self, state: &PoolState, expected_version: u64) -> Result<u64, StoreError>;

    /// Short backend name for log lines.
    fn describe(&self) -> &'static str;
}

/// Reads a seed document (same layout as the stored document) from disk.
///
/// # Errors
///
/// Returns a [`StoreError`] if the file cannot be read or decoded, or if
/// it breaks the pool invariants.
pub async fn load_seed(path: &Path) -> Result<PoolState, StoreError> {
    let bytes = tokio::fs::read(path).await?;
    let doc: models::PoolDocument = serde_json::from_slice(&bytes)?;
    doc.into_state()
}

/// Opens the configured backend, seeding it from `SEED_FILE` when it holds
/// no pool yet.
///
/// # Errors
///
/// Returns a [`StoreError`] if the backend cannot be reached or the seed
/// document is unreadable.
pub async fn open(config: &DrawConfig) -> Result<Arc<dyn PoolStore>, StoreError> {
    match config.store_backend {
        StoreBackend::File => {
            let store = JsonFileStore::new(&config.state_file);
            if let Some(seed) = &config.seed_file
                && !tokio::fs::try_exists(store.path()).await?
            {
                store.seed(&load_seed(seed).await?).await?;
                tracing::info!(path = %store.path().display(), seed = %seed.display(), "pool document seeded");
            }
            Ok(Arc::new(store))
        }
        StoreBackend::Postgres => {
            let store = PostgresStore::connect(
                &config.database_url,
                config.database_max_connections,
                Duration::from_secs(config.database_connect_timeout_secs),
            )
            .await?;
            store.ensure_schema().await?;
            if let Some(seed) = &config.seed_file
                && store.seed_if_empty(&load_seed(seed).await?).await?
            {
                tracing::info!(seed = %seed.display(), "pool table seeded");
            }
            Ok(Arc::new(store))
        }
    }
}
