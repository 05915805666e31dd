//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` and depend only on the
//! account port, so they stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::AccountCommand;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
}

impl HttpState {
    /// Construct state around an account port implementation.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use accounts::domain::{AccountPolicy, AccountService};
    /// use accounts::inbound::http::state::HttpState;
    /// use accounts::outbound::crypto::Argon2CredentialHasher;
    /// use accounts::outbound::email::LogEmailSender;
    /// use accounts::outbound::memory::{InMemoryResetTokenStore, InMemoryUserRepository};
    ///
    /// let service = AccountService::new(
    ///     Arc::new(InMemoryUserRepository::default()),
    ///     Arc::new(InMemoryResetTokenStore::default()),
    ///     Arc::new(LogEmailSender),
    ///     Arc::new(Argon2CredentialHasher::default()),
    ///     AccountPolicy::default(),
    /// );
    /// let state = HttpState::new(Arc::new(service));
    /// let _accounts = state.accounts.clone();
    /// ```
    pub fn new(accounts: Arc<dyn AccountCommand>) -> Self {
        Self { accounts }
    }
}
