//! Port for the per-request session owned by the transport layer.
use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Failures reading, writing or destroying the session.
    pub enum SessionError {
        /// The session store rejected the operation.
        Store { message: String } => "session store failure: {message}",
    }
}

/// Request-local session associating a client with a user id.
///
/// Implementations are bound to a single request and need not be `Send`.
#[cfg_attr(test, mockall::automock)]
pub trait SessionHolder {
    /// Bind the session to `user_id`.
    fn set_user_id(&self, user_id: UserId) -> Result<(), SessionError>;

    /// User id bound to the session, if any.
    fn user_id(&self) -> Result<Option<UserId>, SessionError>;

    /// Destroy the session.
    fn destroy(&self) -> Result<(), SessionError>;
}
