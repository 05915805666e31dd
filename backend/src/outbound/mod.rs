//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed user repository using Diesel ORM
//! - **cache**: Redis-backed reset token store
//! - **email**: log and HTTP relay email senders
//! - **crypto**: Argon2id credential hasher
//! - **memory**: process-local adapters for development and tests
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod cache;
pub mod crypto;
pub mod email;
pub mod memory;
pub mod persistence;
