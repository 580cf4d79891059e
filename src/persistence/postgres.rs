//! PostgreSQL implementation of the persistence layer.
//!
//! The pool lives in a single row of `pool_state`. The `version` column
//! turns every write into a conditional update, so two writers that read
//! the same version cannot both commit.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;

use super::models::PoolDocument;
use super::{PoolStore, StoredState};
use crate::domain::PoolState;
use crate::error::StoreError;

const STATE_ROW_ID: i16 = 1;

/// PostgreSQL-backed pool store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store on an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` with the given pool limits.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError::Database`] if the connection cannot be
    /// established.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        connect_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(connect_timeout)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Creates the `pool_state` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError::Database`] on database failure.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS pool_state (\
                id SMALLINT PRIMARY KEY CHECK (id = 1), \
                version BIGINT NOT NULL, \
                document JSONB NOT NULL, \
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now())",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts `state` as the initial document unless one already exists.
    ///
    /// Returns `true` if the row was inserted.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on encode or database failure.
    pub async fn seed_if_empty(&self, state: &PoolState) -> Result<bool, StoreError> {
        let doc = PoolDocument::from_state(state, 0);
        let result = sqlx::query(
            "INSERT INTO pool_state (id, version, document) VALUES ($1, 0, $2) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(STATE_ROW_ID)
        .bind(Json(&doc))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl PoolStore for PostgresStore {
    async fn read(&self) -> Result<StoredState, StoreError> {
        let row = sqlx::query_as::<_, (i64, Json<PoolDocument>)>(
            "SELECT version, document FROM pool_state WHERE id = $1",
        )
        .bind(STATE_ROW_ID)
        .fetch_optional(&self.pool)
        .await?;

        let Some((version, Json(doc))) = row else {
            return Err(StoreError::NotSeeded("pool_state table is empty".to_string()));
        };
        let version = u64::try_from(version)
            .map_err(|_| StoreError::Corrupt(format!("negative version {version}")))?;
        let state = doc.into_state()?;
        Ok(StoredState { state, version })
    }

    async fn write(&self, state: &PoolState, expected_version: u64) -> Result<u64, StoreError> {
        let expected = i64::try_from(expected_version)
            .map_err(|_| StoreError::Corrupt(format!("version {expected_version} out of range")))?;
        let next = expected_version.saturating_add(1);
        // The version inside the JSON mirrors the column for readers of the
        // raw document; the column is authoritative.
        let doc = PoolDocument::from_state(state, next);

        let result = sqlx::query(
            "UPDATE pool_state SET document = $1, version = version + 1, updated_at = now() \
             WHERE id = $2 AND version = $3",
        )
        .bind(Json(&doc))
        .bind(STATE_ROW_ID)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let found = sqlx::query_scalar::<_, i64>("SELECT version FROM pool_state WHERE id = $1")
                .bind(STATE_ROW_ID)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| StoreError::NotSeeded("pool_state table is empty".to_string()))?;
            return Err(StoreError::VersionConflict {
                expected: expected_version,
                found: u64::try_from(found).unwrap_or_default(),
            });
        }

        tracing::debug!(version = next, "pool document written");
        Ok(next)
    }

    fn describe(&self) -> &'static str {
        "postgres"
    }
}
