//! Candidate recipient held in the name pool.

/// A recipient identity that can be drawn, with its reference link.
///
/// Lives in the unassigned pool until drawn. Once drawn it moves into an
/// [`super::Assignment`] and never returns to the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateName {
    /// Display identity of the recipient. Unique across the whole state.
    pub identity: String,
    /// External resource link revealed together with the identity.
    pub reference_link: String,
}

impl CandidateName {
    /// Creates a candidate from an identity and its reference link.
    #[must_use]
    pub fn new(identity: impl Into<String>, reference_link: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            reference_link: reference_link.into(),
        }
    }

    /// Returns `true` if this candidate is the person called `name`.
    ///
    /// Comparison ignores case and surrounding whitespace.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.identity.trim().to_lowercase() == name.trim().to_lowercase()
    }
}
