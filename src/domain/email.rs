//! Normalized registrant email.
//!
//! [`Email`] is the key of the credential store. Two emails that differ only
//! in case or surrounding whitespace refer to the same registrant.

use std::fmt;

/// Case-normalized registrant email.
///
/// Constructed only through [`Email::parse`], so every value held by the
/// domain is already trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Email(String);

impl Email {
    /// Normalizes a raw email. Returns `None` when nothing is left after
    /// trimming.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    /// Returns the normalized form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parse_lowercases_and_trims() {
        let Some(email) = Email::parse("  Alice@Example.COM ") else {
            panic!("valid email");
        };
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn parse_rejects_blank() {
        assert!(Email::parse("").is_none());
        assert!(Email::parse("   ").is_none());
    }

    #[test]
    fn case_variants_are_equal() {
        assert_eq!(Email::parse("BOB@x.org"), Email::parse("bob@X.ORG"));
    }

    #[test]
    fn display_is_normalized() {
        let Some(email) = Email::parse("Carol@Y.io") else {
            panic!("valid email");
        };
        assert_eq!(format!("{email}"), "carol@y.io");
    }
}
