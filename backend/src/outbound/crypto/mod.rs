//! Argon2id credential hasher.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=...`) carrying their own salt
//! and parameters, so verification works across parameter changes.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash as PhcHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use tracing::debug;

use crate::domain::PasswordHash;
use crate::domain::ports::{CredentialHasher, HashingError};

/// [`CredentialHasher`] backed by Argon2id with a fresh random salt per hash.
#[derive(Debug, Clone, Default)]
pub struct Argon2CredentialHasher {
    argon2: Argon2<'static>,
}

impl Argon2CredentialHasher {
    /// Hasher using explicit cost parameters.
    ///
    /// # Examples
    /// ```
    /// use accounts::domain::ports::CredentialHasher;
    /// use accounts::outbound::crypto::Argon2CredentialHasher;
    /// use argon2::Params;
    ///
    /// let params = Params::new(8, 1, 1, None).expect("valid params");
    /// let hasher = Argon2CredentialHasher::with_params(params);
    /// let hash = hasher.hash("hunter22").expect("hashes");
    /// assert!(hasher.verify(&hash, "hunter22"));
    /// ```
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, HashingError> {
        let salt = SaltString::generate(&mut OsRng);
        let encoded = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| HashingError::algorithm(err.to_string()))?
            .to_string();
        PasswordHash::new(encoded).map_err(|err| HashingError::algorithm(err.to_string()))
    }

    fn verify(&self, hash: &PasswordHash, candidate: &str) -> bool {
        let parsed = match PhcHash::new(hash.as_str()) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(error = %err, "stored password hash is malformed");
                return false;
            }
        };
        self.argon2
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    }
}
