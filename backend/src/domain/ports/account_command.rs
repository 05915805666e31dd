//! Driving port for the account lifecycle.
//!
//! Inbound adapters call this port for every account operation. The session
//! is passed per call because it belongs to the request, not to the service.
//! Expected failures come back as [`crate::domain::FieldErrors`] data; the trait never
//! returns a transport fault for them.

use async_trait::async_trait;

use crate::domain::{
    AccountResult, Error, ForgotPasswordRequest, LoginRequest, RegisterRequest,
    ResetPasswordRequest, User,
};

use super::SessionHolder;

/// Account use-cases.
///
/// Futures are not required to be `Send` because session holders are
/// request-local. Implementors are shared across HTTP workers.
#[async_trait(?Send)]
pub trait AccountCommand: Send + Sync {
    /// Create an account and bind the session to it.
    async fn register(
        &self,
        request: RegisterRequest,
        session: &dyn SessionHolder,
    ) -> AccountResult<User>;

    /// Authenticate by username or email and bind the session.
    async fn login(&self, request: LoginRequest, session: &dyn SessionHolder)
    -> AccountResult<User>;

    /// Destroy the session. Returns `false` when the session could not be
    /// destroyed.
    async fn logout(&self, session: &dyn SessionHolder) -> bool;

    /// Issue a reset token and email a reset link.
    async fn forgot_password(&self, request: ForgotPasswordRequest) -> AccountResult<()>;

    /// Redeem a reset token, set the new password and bind the session.
    async fn reset_password(
        &self,
        request: ResetPasswordRequest,
        session: &dyn SessionHolder,
    ) -> AccountResult<User>;

    /// User bound to the session, if any.
    async fn current_user(&self, session: &dyn SessionHolder) -> Result<Option<User>, Error>;
}
