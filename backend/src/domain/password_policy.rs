//! Configurable password strength policy.

/// Default minimum password length, in characters.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

/// Reason a password failed the policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordPolicyViolation {
    /// Fewer characters than the configured minimum.
    #[error("length must be at least {min_length}")]
    TooShort {
        /// Configured minimum.
        min_length: usize,
    },
    /// Letter-and-digit rule enabled and not met.
    #[error("must contain at least one letter and one digit")]
    MissingLetterOrDigit,
}

/// Strength rules applied to new passwords.
///
/// # Examples
/// ```
/// use accounts::domain::PasswordPolicy;
///
/// let policy = PasswordPolicy::default().with_letter_and_digit(true);
/// assert!(policy.check("hunter22a").is_ok());
/// assert!(policy.check("password").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    min_length: usize,
    require_letter_and_digit: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_PASSWORD_LENGTH,
            require_letter_and_digit: false,
        }
    }
}

impl PasswordPolicy {
    /// Policy requiring at least `min_length` characters (minimum 1).
    #[must_use]
    pub fn new(min_length: usize) -> Self {
        Self {
            min_length: min_length.max(1),
            ..Self::default()
        }
    }

    /// Toggle the letter-and-digit rule.
    #[must_use]
    pub const fn with_letter_and_digit(mut self, required: bool) -> Self {
        self.require_letter_and_digit = required;
        self
    }

    /// Configured minimum length.
    #[must_use]
    pub const fn min_length(&self) -> usize {
        self.min_length
    }

    /// Check `password` against the policy.
    pub fn check(&self, password: &str) -> Result<(), PasswordPolicyViolation> {
        if password.chars().count() < self.min_length {
            return Err(PasswordPolicyViolation::TooShort {
                min_length: self.min_length,
            });
        }
        if self.require_letter_and_digit {
            let has_letter = password.chars().any(char::is_alphabetic);
            let has_digit = password.chars().any(|c| c.is_ascii_digit());
            if !(has_letter && has_digit) {
                return Err(PasswordPolicyViolation::MissingLetterOrDigit);
            }
        }
        Ok(())
    }
}
