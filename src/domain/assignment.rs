//! Registrants and the assignments made for them.

use super::{CandidateName, Email};

/// A person who registered for a draw.
///
/// Immutable once created: there is no update or delete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registrant {
    email: Email,
    display_name: String,
    password_secret: String,
}

impl Registrant {
    /// Creates a registrant. The password is kept exactly as given.
    #[must_use]
    pub fn new(
        email: Email,
        display_name: impl Into<String>,
        password_secret: impl Into<String>,
    ) -> Self {
        Self {
            email,
            display_name: display_name.into(),
            password_secret: password_secret.into(),
        }
    }

    /// Normalized email, the registrant key.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Name the registrant gave at registration. Empty for entries loaded
    /// from a dataset that never recorded it.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The stored password secret.
    #[must_use]
    pub fn password_secret(&self) -> &str {
        &self.password_secret
    }

    /// Returns `true` when `email` and `password` identify this registrant.
    ///
    /// The email is already normalized; the password must match exactly.
    #[must_use]
    pub fn matches_credentials(&self, email: &Email, password: &str) -> bool {
        self.email == *email && self.password_secret == password
    }
}

/// The join between a registrant and the candidate drawn for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Who the draw was made for.
    pub registrant: Registrant,
    /// Who they drew.
    pub recipient: CandidateName,
}

impl Assignment {
    /// Records `recipient` as drawn for `registrant`.
    #[must_use]
    pub fn new(registrant: Registrant, recipient: CandidateName) -> Self {
        Self {
            registrant,
            recipient,
        }
    }
}
