//! Serialized shape of the pool document.
//!
//! Matches the dataset layout the presentation layer was built against:
//!
//! ```json
//! {
//!   "unassigned": [ { "Alice": "https://drive.example/alice" } ],
//!   "assigned": [
//!     {
//!       "recipient": { "Bob": "https://drive.example/bob" },
//!       "user": { "carol@example.com": "hunter2" },
//!       "name": "Carol"
//!     }
//!   ]
//! }
//! ```
//!
//! Every candidate and every credential is a single-entry map. `name` is
//! optional and `version` (file backend only) defaults to `0`, so an
//! existing dataset loads unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Assignment, CandidateName, Email, PoolState, Registrant};
use crate::error::StoreError;

/// Single-entry map `{ key: value }`.
pub type SingletonMap = BTreeMap<String, String>;

/// One entry of the `assigned` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignedRecord {
    /// `{ identity: reference_link }` of the drawn candidate.
    pub recipient: SingletonMap,
    /// `{ email: password }` of the registrant.
    pub user: SingletonMap,
    /// Display name given at registration.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// The whole persisted document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolDocument {
    /// Write counter used for conflict detection.
    #[serde(default)]
    pub version: u64,
    /// Candidates not yet drawn.
    #[serde(default)]
    pub unassigned: Vec<SingletonMap>,
    /// Assignments made so far.
    #[serde(default)]
    pub assigned: Vec<AssignedRecord>,
}

impl PoolDocument {
    /// Encodes `state` at the given version.
    #[must_use]
    pub fn from_state(state: &PoolState, version: u64) -> Self {
        Self {
            version,
            unassigned: state.unassigned().iter().map(candidate_entry).collect(),
            assigned: state
                .assigned()
                .iter()
                .map(|a| AssignedRecord {
                    recipient: candidate_entry(&a.recipient),
                    user: SingletonMap::from([(
                        a.registrant.email().to_string(),
                        a.registrant.password_secret().to_string(),
                    )]),
                    name: a.registrant.display_name().to_string(),
                })
                .collect(),
        }
    }

    /// Decodes the document into a validated [`PoolState`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if an entry is not a single-entry
    /// map, an email is blank, or the partition invariants do not hold.
    pub fn into_state(self) -> Result<PoolState, StoreError> {
        let unassigned = self
            .unassigned
            .into_iter()
            .map(|entry| candidate_from(entry, "unassigned"))
            .collect::<Result<Vec<_>, _>>()?;

        let assigned = self
            .assigned
            .into_iter()
            .map(|record| {
                let recipient = candidate_from(record.recipient, "assigned.recipient")?;
                let (raw_email, password) = single_entry(record.user, "assigned.user")?;
                let email = Email::parse(&raw_email).ok_or_else(|| {
                    StoreError::Corrupt("assigned.user has a blank email".to_string())
                })?;
                Ok(Assignment::new(
                    Registrant::new(email, record.name, password),
                    recipient,
                ))
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        let state = PoolState::new(unassigned, assigned);
        state.validate().map_err(StoreError::Corrupt)?;
        Ok(state)
    }
}

fn candidate_entry(candidate: &CandidateName) -> SingletonMap {
    SingletonMap::from([(
        candidate.identity.clone(),
        candidate.reference_link.clone(),
    )])
}

fn candidate_from(entry: SingletonMap, section: &str) -> Result<CandidateName, StoreError> {
    let (identity, link) = single_entry(entry, section)?;
    Ok(CandidateName::new(identity, link))
}

fn single_entry(entry: SingletonMap, section: &str) -> Result<(String, String), StoreError> {
    let len = entry.len();
    let mut iter = entry.into_iter();
    match (iter.next(), len) {
        (Some(pair), 1) => Ok(pair),
        _ => Err(StoreError::Corrupt(format!(
            "{section} entry must have exactly one key, found {len}"
        ))),
    }
}
