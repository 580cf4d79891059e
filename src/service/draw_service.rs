//! Draw service: allocation and recheck on top of a [`PoolStore`].

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tokio::sync::Mutex;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Allocation, CandidateName, Email, Registrant};
use crate::error::{DrawError, StoreError};
use crate::persistence::{PoolStore, StoredState};

/// Counts of both sides of the pool partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PoolSummary {
    /// Candidates still available to draw.
    pub unassigned: usize,
    /// Assignments made so far.
    pub assigned: usize,
}

/// Orchestration layer for allocation and recheck.
///
/// Allocation holds the RNG mutex for the whole read → draw → write cycle,
/// which makes it the single writer within this process. Writes are also
/// version-checked by the store; a conflict from another writer restarts
/// the cycle from a fresh read.
#[derive(Debug)]
pub struct DrawService {
    store: Arc<dyn PoolStore>,
    rng: Mutex<ChaCha8Rng>,
    max_retries: u32,
}

impl DrawService {
    /// Creates a service over `store`.
    ///
    /// With a `seed` the sequence of draws is reproducible; without one the
    /// RNG is seeded from OS entropy.
    #[must_use]
    pub fn new(store: Arc<dyn PoolStore>, seed: Option<u64>, max_retries: u32) -> Self {
        let rng = seed.map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64);
        Self {
            store,
            rng: Mutex::new(rng),
            max_retries,
        }
    }

    /// Returns the backing store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn PoolStore> {
        &self.store
    }

    /// Draws a recipient for a new registrant and persists the assignment.
    ///
    /// # Errors
    ///
    /// - [`DrawError::Validation`] if any field is blank.
    /// - [`DrawError::DuplicateRegistrant`] if the email already drew.
    /// - [`DrawError::PoolExhausted`] if nobody but the registrant is left.
    /// - [`DrawError::Storage`] on read/write failure, or when version
    ///   conflicts outlast the retry budget.
    pub async fn allocate(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
    ) -> Result<Allocation, DrawError> {
        require(&[("email", email), ("name", display_name), ("password", password)])?;
        let email = Email::parse(email)
            .ok_or_else(|| DrawError::Validation("email is required".to_string()))?;
        let registrant = Registrant::new(email.clone(), display_name.trim(), password);
        let draw_id = Uuid::new_v4();

        let mut rng = self.rng.lock().await;
        let mut attempt = 0u32;
        loop {
            let StoredState { mut state, version } = self.store.read().await?;
            let allocation = state.draw(registrant.clone(), &mut *rng)?;

            match self.store.write(&state, version).await {
                Ok(new_version) => {
                    tracing::info!(
                        %draw_id,
                        %email,
                        remaining = state.unassigned().len(),
                        version = new_version,
                        "recipient drawn"
                    );
                    return Ok(allocation);
                }
                Err(StoreError::VersionConflict { expected, found })
                    if attempt < self.max_retries =>
                {
                    attempt += 1;
                    tracing::warn!(%draw_id, expected, found, attempt, "pool changed during draw, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Returns the recipient previously drawn for `email`.
    ///
    /// Read-only: never takes the allocation lock and never writes.
    ///
    /// # Errors
    ///
    /// - [`DrawError::Validation`] if either field is blank.
    /// - [`DrawError::Authentication`] if no assignment matches.
    /// - [`DrawError::Storage`] on read failure.
    pub async fn recheck(&self, email: &str, password: &str) -> Result<CandidateName, DrawError> {
        require(&[("email", email), ("password", password)])?;
        let email = Email::parse(email)
            .ok_or_else(|| DrawError::Validation("email is required".to_string()))?;

        let StoredState { state, .. } = self.store.read().await?;
        let assignment = state
            .authenticate(&email, password)
            .ok_or(DrawError::Authentication)?;

        tracing::debug!(%email, "assignment rechecked");
        Ok(assignment.recipient.clone())
    }

    /// Counts unassigned candidates and assignments.
    ///
    /// # Errors
    ///
    /// Returns [`DrawError::Storage`] on read failure.
    pub async fn summary(&self) -> Result<PoolSummary, DrawError> {
        let StoredState { state, .. } = self.store.read().await?;
        Ok(PoolSummary {
            unassigned: state.unassigned().len(),
            assigned: state.assigned().len(),
        })
    }
}

/// Rejects the request if any named field is blank after trimming.
fn require(fields: &[(&str, &str)]) -> Result<(), DrawError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DrawError::Validation(format!(
            "missing required fields: {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use crate::domain::PoolState;

    /// In-memory store that reports a version conflict on the first
    /// `conflicts` writes, as if another writer got there first.
    #[derive(Debug)]
    struct MemoryStore {
        inner: Mutex<(PoolState, u64)>,
        conflicts: AtomicU32,
        writes: AtomicU32,
    }

    impl MemoryStore {
        fn new(names: &[&str], conflicts: u32) -> Self {
            let state = PoolState::seeded(
                names
                    .iter()
                    .map(|n| CandidateName::new(*n, format!("https://drive.example/{n}")))
                    .collect(),
            );
            Self {
                inner: Mutex::new((state, 0)),
                conflicts: AtomicU32::new(conflicts),
                writes: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl PoolStore for MemoryStore {
        async fn read(&self) -> Result<StoredState, StoreError> {
            let guard = self.inner.lock().await;
            Ok(StoredState {
                state: guard.0.clone(),
                version: guard.1,
            })
        }

        async fn write(&self, state: &PoolState, expected: u64) -> Result<u64, StoreError> {
            let mut guard = self.inner.lock().await;
            if self
                .conflicts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                guard.1 += 1;
                return Err(StoreError::VersionConflict {
                    expected,
                    found: guard.1,
                });
            }
            if guard.1 != expected {
                return Err(StoreError::VersionConflict {
                    expected,
                    found: guard.1,
                });
            }
            guard.0 = state.clone();
            guard.1 += 1;
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(guard.1)
        }

        fn describe(&self) -> &'static str {
            "memory"
        }
    }

    fn service(store: Arc<MemoryStore>) -> DrawService {
        DrawService::new(store, Some(17), 3)
    }

    #[tokio::test]
    async fn scenario_allocate_then_recheck() {
        let store = Arc::new(MemoryStore::new(&["A", "B", "C"], 0));
        let svc = service(Arc::clone(&store));

        let Ok(allocation) = svc.allocate("b@x.io", "B", "pw").await else {
            panic!("allocation failed");
        };
        assert_eq!(allocation.pool_snapshot, vec!["A", "B", "C"]);
        assert!(["A", "C"].contains(&allocation.selected.identity.as_str()));

        let Ok(summary) = svc.summary().await else {
            panic!("summary failed");
        };
        assert_eq!(summary, PoolSummary { unassigned: 2, assigned: 1 });

        let first = svc.recheck("B@X.IO", "pw").await;
        let second = svc.recheck("b@x.io", "pw").await;
        let (Ok(first), Ok(second)) = (first, second) else {
            panic!("recheck failed");
        };
        assert_eq!(first, allocation.selected);
        assert_eq!(first, second);
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn duplicate_email_leaves_pool_unchanged() {
        let store = Arc::new(MemoryStore::new(&["A", "B", "C"], 0));
        let svc = service(Arc::clone(&store));
        tokio_test::assert_ok!(svc.allocate("d@x.io", "D", "pw").await);

        let result = svc.allocate("D@x.io", "D", "other").await;
        assert!(matches!(result, Err(DrawError::DuplicateRegistrant(_))));
        let Ok(summary) = svc.summary().await else {
            panic!("summary failed");
        };
        assert_eq!(summary.unassigned, 2);
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn only_self_left_is_exhausted() {
        let store = Arc::new(MemoryStore::new(&["A"], 0));
        let svc = service(Arc::clone(&store));
        let result = svc.allocate("a@x.io", "a", "pw").await;
        assert!(matches!(result, Err(DrawError::PoolExhausted)));
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn wrong_password_fails_authentication() {
        let store = Arc::new(MemoryStore::new(&["A", "B"], 0));
        let svc = service(Arc::clone(&store));
        tokio_test::assert_ok!(svc.allocate("e@x.io", "E", "Secret").await);

        let result = svc.recheck("e@x.io", "secret").await;
        assert!(matches!(result, Err(DrawError::Authentication)));
        let result = svc.recheck("nobody@x.io", "Secret").await;
        assert!(matches!(result, Err(DrawError::Authentication)));
    }

    #[tokio::test]
    async fn blank_fields_are_validation_errors() {
        let store = Arc::new(MemoryStore::new(&["A", "B"], 0));
        let svc = service(Arc::clone(&store));

        let Err(DrawError::Validation(msg)) = svc.allocate(" ", "N", "").await else {
            panic!("expected validation error");
        };
        assert!(msg.contains("email") && msg.contains("password") && !msg.contains("name"));

        let result = svc.recheck("a@x.io", "   ").await;
        assert!(matches!(result, Err(DrawError::Validation(_))));
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn version_conflict_is_retried() {
        let store = Arc::new(MemoryStore::new(&["A", "B", "C"], 2));
        let svc = service(Arc::clone(&store));
        tokio_test::assert_ok!(svc.allocate("f@x.io", "F", "pw").await);
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn persistent_conflict_surfaces_as_storage_error() {
        let store = Arc::new(MemoryStore::new(&["A", "B", "C"], 10));
        let svc = service(Arc::clone(&store));
        let result = svc.allocate("g@x.io", "G", "pw").await;
        assert!(matches!(result, Err(DrawError::Storage(_))));
        let Ok(summary) = svc.summary().await else {
            panic!("summary failed");
        };
        assert_eq!(summary.unassigned, 3);
    }

    #[tokio::test]
    async fn concurrent_allocations_never_share_a_recipient() {
        let store = Arc::new(MemoryStore::new(&["A", "B", "C", "D", "E", "F"], 0));
        let svc = Arc::new(service(Arc::clone(&store)));

        let handles: Vec<_> = (0..5)
            .map(|i| {
                let svc = Arc::clone(&svc);
                tokio::spawn(async move {
                    svc.allocate(&format!("p{i}@x.io"), &format!("P{i}"), "pw")
                        .await
                })
            })
            .collect();

        let mut drawn = std::collections::HashSet::new();
        for handle in handles {
            let Ok(Ok(allocation)) = handle.await else {
                panic!("allocation failed");
            };
            assert!(drawn.insert(allocation.selected.identity));
        }
        let Ok(summary) = svc.summary().await else {
            panic!("summary failed");
        };
        assert_eq!(summary, PoolSummary { unassigned: 1, assigned: 5 });
    }
}
