//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use argon2::Params;

use crate::domain::{AccountPolicy, AccountService};
use crate::inbound::http::state::HttpState;
use crate::outbound::crypto::Argon2CredentialHasher;
use crate::outbound::memory::{InMemoryOutbox, InMemoryResetTokenStore, InMemoryUserRepository};

/// Cookie session middleware with a fresh key and `Secure` off for plain
/// HTTP test requests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Handler state backed by in-memory adapters and a cheap Argon2 cost.
///
/// Returns the outbox so tests can read reset links.
pub fn in_memory_state(policy: AccountPolicy) -> (HttpState, Arc<InMemoryOutbox>) {
    let outbox = Arc::new(InMemoryOutbox::default());
    let params = Params::new(8, 1, 1, None).expect("valid argon2 params");
    let service = AccountService::new(
        Arc::new(InMemoryUserRepository::default()),
        Arc::new(InMemoryResetTokenStore::default()),
        Arc::clone(&outbox),
        Arc::new(Argon2CredentialHasher::with_params(params)),
        policy,
    );
    (HttpState::new(Arc::new(service)), outbox)
}
