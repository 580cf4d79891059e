//! Whole-pool state: the unassigned names and the assignments made so far.
//!
//! [`PoolState`] is the single shared document of the service. It is read
//! in full, mutated in memory by [`PoolState::draw`], and written back in
//! full. The two collections are a disjoint partition of the fixed name
//! universe seeded at setup time.

use std::collections::HashSet;

use rand::Rng;

use super::{Assignment, CandidateName, Email, Registrant};
use crate::error::DrawError;

/// Outcome of a successful draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// The candidate drawn for the registrant.
    pub selected: CandidateName,
    /// Identities of every unassigned candidate immediately before the
    /// draw, in pool order. Includes `selected`.
    pub pool_snapshot: Vec<String>,
}

/// Partition of the name universe into unassigned candidates and
/// assignments.
///
/// # Invariants
///
/// - No identity appears twice, neither within a collection nor across
///   both.
/// - At most one assignment exists per normalized email.
///
/// [`PoolState::draw`] preserves both. [`PoolState::validate`] checks them
/// for state that came from outside (a loaded document).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolState {
    unassigned: Vec<CandidateName>,
    assigned: Vec<Assignment>,
}

impl PoolState {
    /// Builds a state from both collections. Call [`Self::validate`] before
    /// trusting it.
    #[must_use]
    pub fn new(unassigned: Vec<CandidateName>, assigned: Vec<Assignment>) -> Self {
        Self {
            unassigned,
            assigned,
        }
    }

    /// Builds a freshly seeded state with no assignments.
    #[must_use]
    pub fn seeded(unassigned: Vec<CandidateName>) -> Self {
        Self::new(unassigned, Vec::new())
    }

    /// Candidates not yet drawn, in pool order.
    #[must_use]
    pub fn unassigned(&self) -> &[CandidateName] {
        &self.unassigned
    }

    /// Assignments in the order they were made.
    #[must_use]
    pub fn assigned(&self) -> &[Assignment] {
        &self.assigned
    }

    /// Returns the assignment held by `email`, if any.
    #[must_use]
    pub fn find_assignment(&self, email: &Email) -> Option<&Assignment> {
        self.assigned
            .iter()
            .find(|a| a.registrant.email() == email)
    }

    /// Returns the assignment whose credentials match `email` and
    /// `password`.
    #[must_use]
    pub fn authenticate(&self, email: &Email, password: &str) -> Option<&Assignment> {
        self.assigned
            .iter()
            .find(|a| a.registrant.matches_credentials(email, password))
    }

    /// Identities of all unassigned candidates, in pool order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.unassigned
            .iter()
            .map(|c| c.identity.clone())
            .collect()
    }

    /// Positions in the unassigned pool that `display_name` may draw.
    #[must_use]
    pub fn eligible_indices(&self, display_name: &str) -> Vec<usize> {
        self.unassigned
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_named(display_name))
            .map(|(i, _)| i)
            .collect()
    }

    /// Draws a recipient for `registrant` and records the assignment.
    ///
    /// The pick is uniform over the eligible candidates. On error the state
    /// is left untouched.
    ///
    /// # Errors
    ///
    /// - [`DrawError::DuplicateRegistrant`] if the email already holds an
    ///   assignment.
    /// - [`DrawError::PoolExhausted`] if every remaining candidate is the
    ///   registrant themself, or the pool is empty.
    pub fn draw<R: Rng + ?Sized>(
        &mut self,
        registrant: Registrant,
        rng: &mut R,
    ) -> Result<Allocation, DrawError> {
        if self.find_assignment(registrant.email()).is_some() {
            return Err(DrawError::DuplicateRegistrant(
                registrant.email().to_string(),
            ));
        }

        let eligible = self.eligible_indices(registrant.display_name());
        if eligible.is_empty() {
            return Err(DrawError::PoolExhausted);
        }

        // Captured before removal: the reveal spins over every name that
        // was still in the pool, including the one about to be drawn.
        let pool_snapshot = self.snapshot();

        let pick = rng.gen_range(0..eligible.len());
        let Some(&index) = eligible.get(pick) else {
            return Err(DrawError::PoolExhausted);
        };
        let selected = self.unassigned.remove(index);
        self.assigned
            .push(Assignment::new(registrant, selected.clone()));

        Ok(Allocation {
            selected,
            pool_snapshot,
        })
    }

    /// Checks the partition invariants.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        let mut identities = HashSet::new();
        let drawn = self.assigned.iter().map(|a| &a.recipient);
        for candidate in self.unassigned.iter().chain(drawn) {
            if !identities.insert(candidate.identity.as_str()) {
                return Err(format!(
                    "identity {:?} appears more than once",
                    candidate.identity
                ));
            }
        }

        let mut emails = HashSet::new();
        for assignment in &self.assigned {
            let email = assignment.registrant.email();
            if !emails.insert(email) {
                return Err(format!("email {email} holds more than one assignment"));
            }
        }
        Ok(())
    }
}
