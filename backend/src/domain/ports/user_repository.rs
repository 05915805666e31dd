//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{EmailAddress, NewUserRecord, PasswordHash, User, UserAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The username is already held by another account.
        DuplicateUsername => "username already taken",
        /// The email is already held by another account.
        DuplicateEmail => "email already taken",
    }
}

/// Storage for user accounts.
///
/// Lookups use exact matching. Absence is `Ok(None)`, never an error. The
/// store's own uniqueness constraints are authoritative: `create` reports
/// collisions as [`UserPersistenceError::DuplicateUsername`] or
/// [`UserPersistenceError::DuplicateEmail`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Fetch an account by username.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Fetch an account by email.
    async fn find_by_email(&self, email: &str)
    -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Fetch an account whose username or email equals `credential`.
    async fn find_by_username_or_email(
        &self,
        credential: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Insert a new account and return its public view.
    async fn create(&self, record: NewUserRecord) -> Result<User, UserPersistenceError>;

    /// Replace the password hash of the account owning `email`.
    ///
    /// Returns `Ok(None)` when no account matches.
    async fn update_password_by_email(
        &self,
        email: &EmailAddress,
        password_hash: PasswordHash,
    ) -> Result<Option<User>, UserPersistenceError>;
}
