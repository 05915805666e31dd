//! Domain primitives, validators and the account service.
//!
//! Purpose: define strongly typed account entities and the use-cases acting
//! on them. Keep types immutable and document invariants and serialisation
//! contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - User (alias to `user::User`) — public account view.
//! - FieldError / FieldErrors — validation failures returned as data.
//! - AccountService — implementation of the account driving port.

pub mod account_service;
pub mod auth;
pub mod error;
pub mod field_error;
pub mod password_policy;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod validation;

pub use self::account_service::{
    ACCOUNT_GONE, ACCOUNT_NOT_FOUND, AccountPolicy, AccountService, DEFAULT_RESET_LINK_BASE,
    DEFAULT_RESET_TOKEN_TTL, TEMPORARILY_UNAVAILABLE, TOKEN_EXPIRED,
};
pub use self::auth::{ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::field_error::{AccountResult, FieldError, FieldErrors, fields};
pub use self::password_policy::{
    DEFAULT_MIN_PASSWORD_LENGTH, PasswordPolicy, PasswordPolicyViolation,
};
pub use self::trace_id::{TraceId, spawn_traced};
pub use self::user::{
    EMAIL_MAX, EmailAddress, NewUserRecord, PasswordHash, USERNAME_MAX, USERNAME_MIN, User,
    UserAccount, UserId, UserValidationError, Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use accounts::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
