//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving port: [`AccountCommand`]. Driven ports: [`UserRepository`],
//! [`ResetTokenStore`], [`EmailSender`], [`SessionHolder`] and
//! [`CredentialHasher`].

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod cache_key;
mod credential_hasher;
mod email_sender;
mod reset_token_store;
mod session_holder;
mod user_repository;

pub use account_command::AccountCommand;
pub use cache_key::{RESET_TOKEN_PREFIX, ResetToken, ResetTokenKey, ResetTokenKeyValidationError};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHasher, HashingError};
#[cfg(test)]
pub use email_sender::MockEmailSender;
pub use email_sender::{EmailDeliveryError, EmailMessage, EmailSender};
#[cfg(test)]
pub use reset_token_store::MockResetTokenStore;
pub use reset_token_store::{ResetTokenStore, ResetTokenStoreError};
#[cfg(test)]
pub use session_holder::MockSessionHolder;
pub use session_holder::{SessionError, SessionHolder};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
