//! Field validators for account operations.
//!
//! Pure validators return `Option<FieldError>`. Validators that consult the
//! user store return `Result<Option<FieldError>, UserPersistenceError>` so the
//! caller decides how a store outage is reported. None of them write.

use crate::domain::field_error::fields;
use crate::domain::ports::{CredentialHasher, UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, FieldError, PasswordHash, PasswordPolicy, UserValidationError, Username};

/// Message returned when a password does not verify.
pub const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Account attribute that must be unique across users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    /// Username.
    Username,
    /// Email address.
    Email,
}

impl UniqueField {
    const fn field(self) -> &'static str {
        match self {
            Self::Username => fields::USERNAME,
            Self::Email => fields::EMAIL,
        }
    }

    const fn taken_message(self) -> &'static str {
        match self {
            Self::Username => "username already taken",
            Self::Email => "email already taken",
        }
    }

    /// Field error reported when the value is already held by another account.
    pub fn taken(self) -> FieldError {
        FieldError::new(self.field(), self.taken_message())
    }
}

/// Fails on `username` when the value is blank.
pub fn validate_username_not_empty(username: &str) -> Option<FieldError> {
    username
        .trim()
        .is_empty()
        .then(|| FieldError::new(fields::USERNAME, UserValidationError::EmptyUsername.to_string()))
}

/// Fails on `username` when a non-blank value breaks the username rules.
///
/// Blank values are left to [`validate_username_not_empty`].
pub fn validate_username_format(username: &str) -> Option<FieldError> {
    match Username::new(username.trim()) {
        Ok(_) | Err(UserValidationError::EmptyUsername) => None,
        Err(error) => Some(FieldError::new(fields::USERNAME, error.to_string())),
    }
}

/// Fails on `email` when the value is not shaped like an address.
pub fn validate_email_format(email: &str) -> Option<FieldError> {
    EmailAddress::new(email.trim())
        .err()
        .map(|error| FieldError::new(fields::EMAIL, error.to_string()))
}

/// Fails on the field named by `field` when an account already holds `value`.
pub async fn validate_user_does_not_exist<U>(
    field: UniqueField,
    value: &str,
    users: &U,
) -> Result<Option<FieldError>, UserPersistenceError>
where
    U: UserRepository + ?Sized,
{
    let existing = match field {
        UniqueField::Username => users.find_by_username(value).await?,
        UniqueField::Email => users.find_by_email(value).await?,
    };
    Ok(existing.map(|_| field.taken()))
}

/// Fails on `username` when the username is taken.
pub async fn validate_new_username<U>(
    username: &str,
    users: &U,
) -> Result<Option<FieldError>, UserPersistenceError>
where
    U: UserRepository + ?Sized,
{
    validate_user_does_not_exist(UniqueField::Username, username, users).await
}

/// Fails on `email` when the email is taken.
pub async fn validate_new_email<U>(
    email: &str,
    users: &U,
) -> Result<Option<FieldError>, UserPersistenceError>
where
    U: UserRepository + ?Sized,
{
    validate_user_does_not_exist(UniqueField::Email, email, users).await
}

/// Fails on `email` when no account uses the address.
///
/// This reveals whether an address is registered; callers decide whether to
/// surface it.
pub async fn validate_email_exists<U>(
    email: &str,
    users: &U,
) -> Result<Option<FieldError>, UserPersistenceError>
where
    U: UserRepository + ?Sized,
{
    let existing = users.find_by_email(email).await?;
    Ok(existing
        .is_none()
        .then(|| FieldError::new(fields::EMAIL, "email not found")))
}

/// Fails on `password` when `password` breaks `policy`.
pub fn validate_password_strength(password: &str, policy: &PasswordPolicy) -> Option<FieldError> {
    policy
        .check(password)
        .err()
        .map(|violation| FieldError::new(fields::PASSWORD, violation.to_string()))
}

/// Fails on `password` with a generic message when `candidate` does not
/// verify against `stored`.
pub fn validate_correct_password<H>(
    stored: &PasswordHash,
    candidate: &str,
    hasher: &H,
) -> Option<FieldError>
where
    H: CredentialHasher + ?Sized,
{
    (!hasher.verify(stored, candidate))
        .then(|| FieldError::new(fields::PASSWORD, INVALID_CREDENTIALS))
}

/// Fails on `newPasswordConfirm` when the two values differ.
pub fn validate_new_passwords_match(password: &str, confirm: &str) -> Option<FieldError> {
    (password != confirm)
        .then(|| FieldError::new(fields::NEW_PASSWORD_CONFIRM, "passwords must match"))
}
