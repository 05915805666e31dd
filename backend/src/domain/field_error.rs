//! Field-scoped validation failures returned as data by account operations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Field names reported to callers.
pub mod fields {
    /// Registration username.
    pub const USERNAME: &str = "username";
    /// Registration or recovery email.
    pub const EMAIL: &str = "email";
    /// Password supplied at registration or login.
    pub const PASSWORD: &str = "password";
    /// Login credential (username or email).
    pub const USERNAME_OR_EMAIL: &str = "usernameOrEmail";
    /// New password at reset.
    pub const NEW_PASSWORD: &str = "newPassword";
    /// Confirmation of the new password at reset.
    pub const NEW_PASSWORD_CONFIRM: &str = "newPasswordConfirm";
    /// Reset token.
    pub const TOKEN: &str = "token";
}

/// One validation failure: which field, and why.
///
/// # Examples
/// ```
/// use accounts::domain::FieldError;
///
/// let error = FieldError::new("username", "username already taken");
/// assert_eq!(error.field(), "username");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    field: String,
    message: String,
}

impl FieldError {
    /// Create a field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Field the failure applies to.
    pub fn field(&self) -> &str {
        self.field.as_str()
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Re-target the error at another field, keeping the message.
    #[must_use]
    pub fn for_field(self, field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: self.message,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Ordered collection of field errors.
///
/// An `Err(FieldErrors)` is never empty when produced by
/// [`FieldErrors::into_result`] or [`FieldErrors::single`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Start an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// A collection holding exactly one error.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldError::new(field, message)])
    }

    /// Append an error.
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Append the error if there is one.
    pub fn push_some(&mut self, error: Option<FieldError>) {
        if let Some(error) = error {
            self.0.push(error);
        }
    }

    /// Whether any errors were collected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of collected errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether an error was recorded for `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field() == field)
    }

    /// Iterate over the collected errors.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// `Ok(value)` when empty, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    /// Consume into the underlying vector.
    pub fn into_vec(self) -> Vec<FieldError> {
        self.0
    }
}

impl From<FieldError> for FieldErrors {
    fn from(value: FieldError) -> Self {
        Self(vec![value])
    }
}

impl FromIterator<FieldError> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Result of an account operation: a value, or the field errors explaining
/// why it was refused.
pub type AccountResult<T> = Result<T, FieldErrors>;
