//! In-memory adapters for local development and tests.
//!
//! State lives for the life of the process. Expiry and uniqueness follow the
//! Redis and PostgreSQL adapters so flows behave the same against either.

mod outbox;
mod reset_token_store;
mod user_repository;

pub use outbox::InMemoryOutbox;
pub use reset_token_store::InMemoryResetTokenStore;
pub use user_repository::InMemoryUserRepository;
