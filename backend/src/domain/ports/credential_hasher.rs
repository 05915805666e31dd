//! Port for one-way password hashing.
use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Hashing failures.
    pub enum HashingError {
        /// The algorithm rejected its input or parameters.
        Algorithm { message: String } => "password hashing failed: {message}",
    }
}

/// One-way password hashing with per-call random salts.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Hash `password`. Two calls with the same input yield different hashes.
    fn hash(&self, password: &str) -> Result<PasswordHash, HashingError>;

    /// Whether `candidate` matches `hash`.
    ///
    /// Returns `false` for malformed hashes rather than failing.
    fn verify(&self, hash: &PasswordHash, candidate: &str) -> bool;
}
