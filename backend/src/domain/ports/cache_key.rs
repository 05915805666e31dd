//! Reset token and the namespaced cache key it is stored under.
use thiserror::Error;
use uuid::Uuid;

/// Namespace prepended to every reset token key.
pub const RESET_TOKEN_PREFIX: &str = "forget-password:";

/// Opaque password-reset token handed to the account owner.
///
/// Backed by a random UUID v4 (122 bits of entropy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResetToken(Uuid);

impl ResetToken {
    /// Generate a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a token presented by a caller.
    ///
    /// Surrounding whitespace is ignored; anything that is not a UUID is
    /// rejected.
    pub fn parse(raw: &str) -> Result<Self, ResetTokenKeyValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ResetTokenKeyValidationError::Empty);
        }
        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|_| ResetTokenKeyValidationError::Malformed)
    }

    /// Cache key for this token.
    #[must_use]
    pub fn key(&self) -> ResetTokenKey {
        ResetTokenKey(format!("{RESET_TOKEN_PREFIX}{}", self.0))
    }
}

impl std::fmt::Display for ResetToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cache key under which a reset token maps to an email address.
///
/// Always carries [`RESET_TOKEN_PREFIX`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResetTokenKey(String);

impl ResetTokenKey {
    /// Validate a raw key read back from a store.
    pub fn new(value: impl Into<String>) -> Result<Self, ResetTokenKeyValidationError> {
        let raw = value.into();
        let Some(token) = raw.strip_prefix(RESET_TOKEN_PREFIX) else {
            return Err(ResetTokenKeyValidationError::MissingPrefix);
        };
        if token.trim() != token {
            return Err(ResetTokenKeyValidationError::ContainsWhitespace);
        }
        ResetToken::parse(token).map(|parsed| parsed.key())
    }

    /// Borrow the underlying key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for ResetTokenKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for ResetTokenKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validation errors returned when parsing tokens or keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResetTokenKeyValidationError {
    /// Token is empty after trimming whitespace.
    #[error("reset token must not be empty")]
    Empty,
    /// Token is not a UUID.
    #[error("reset token is malformed")]
    Malformed,
    /// Key lacks the reset token namespace.
    #[error("reset token key must start with `{RESET_TOKEN_PREFIX}`")]
    MissingPrefix,
    /// Key contains surrounding whitespace.
    #[error("reset token key must not contain surrounding whitespace")]
    ContainsWhitespace,
}

#[cfg(test)]
mod tests {
    //! Validates token parsing and key namespacing.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn generated_tokens_are_unique_and_prefixed() {
        let first = ResetToken::generate();
        let second = ResetToken::generate();
        assert_ne!(first, second);
        assert!(first.key().as_str().starts_with(RESET_TOKEN_PREFIX));
        assert_eq!(
            first.key().as_str(),
            format!("forget-password:{first}")
        );
    }

    #[rstest]
    #[case("", ResetTokenKeyValidationError::Empty)]
    #[case("   ", ResetTokenKeyValidationError::Empty)]
    #[case("not-a-token", ResetTokenKeyValidationError::Malformed)]
    fn parse_rejects_invalid_tokens(
        #[case] raw: &str,
        #[case] expected: ResetTokenKeyValidationError,
    ) {
        assert_eq!(ResetToken::parse(raw), Err(expected));
    }

    #[rstest]
    fn parse_trims_and_round_trips() {
        let token = ResetToken::generate();
        let parsed = ResetToken::parse(&format!("  {token} ")).expect("valid token");
        assert_eq!(parsed, token);
    }

    #[rstest]
    #[case("route:abc", ResetTokenKeyValidationError::MissingPrefix)]
    #[case("forget-password: 00000000-0000-0000-0000-000000000000", ResetTokenKeyValidationError::ContainsWhitespace)]
    #[case("forget-password:zzz", ResetTokenKeyValidationError::Malformed)]
    fn key_rejects_foreign_values(
        #[case] raw: &str,
        #[case] expected: ResetTokenKeyValidationError,
    ) {
        assert_eq!(ResetTokenKey::new(raw), Err(expected));
    }

    #[rstest]
    fn key_accepts_namespaced_tokens() {
        let token = ResetToken::generate();
        let key = ResetTokenKey::new(token.key().to_string()).expect("valid key");
        assert_eq!(key, token.key());
    }
}
