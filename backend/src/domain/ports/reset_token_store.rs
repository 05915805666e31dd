//! Port interface for short-lived reset token storage.
use std::time::Duration;

use async_trait::async_trait;

use super::{ResetTokenKey, define_port_error};

define_port_error! {
    /// Errors surfaced by reset token store adapters.
    pub enum ResetTokenStoreError {
        /// Store backend is unavailable or timing out.
        Backend { message: String } => "reset token store backend failure: {message}",
        /// Stored content could not be encoded or decoded.
        Serialization { message: String } => "reset token store serialisation failed: {message}",
    }
}

/// Key-value store mapping reset token keys to email addresses.
///
/// Expiry is the store's responsibility: `get` returns `None` once `ttl` has
/// elapsed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResetTokenStore: Send + Sync {
    /// Store `email` under `key` for `ttl`, replacing any existing value.
    async fn put(
        &self,
        key: &ResetTokenKey,
        email: &str,
        ttl: Duration,
    ) -> Result<(), ResetTokenStoreError>;

    /// Read the email stored under `key`, if present and unexpired.
    async fn get(&self, key: &ResetTokenKey) -> Result<Option<String>, ResetTokenStoreError>;

    /// Read and remove the email stored under `key` in one step.
    ///
    /// Of several concurrent callers at most one receives the email.
    async fn take(&self, key: &ResetTokenKey) -> Result<Option<String>, ResetTokenStoreError>;

    /// Remove `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &ResetTokenKey) -> Result<(), ResetTokenStoreError>;
}
