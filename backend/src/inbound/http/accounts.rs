//! Account API handlers.
//!
//! ```text
//! POST /api/v1/register        {"username","email","password"}
//! POST /api/v1/login           {"usernameOrEmail","password"}
//! POST /api/v1/logout
//! POST /api/v1/forgot-password {"email"}
//! POST /api/v1/reset-password  {"newPassword","newPasswordConfirm","token"}
//! GET  /api/v1/me
//! ```
//!
//! Refused operations still answer `200 OK`; the reasons travel in an
//! `errors` array of `{field, message}` objects.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    AccountResult, FieldErrors, ForgotPasswordRequest, LoginRequest, RegisterRequest,
    ResetPasswordRequest, User,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, FieldErrorSchema, UserSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body for `POST /api/v1/register`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
}

impl From<&RegisterBody> for RegisterRequest {
    fn from(body: &RegisterBody) -> Self {
        Self::new(&body.username, &body.email, &body.password)
    }
}

/// Body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    /// Username or email address.
    #[schema(example = "ada@example.com")]
    pub username_or_email: String,
    pub password: String,
}

impl From<&LoginBody> for LoginRequest {
    fn from(body: &LoginBody) -> Self {
        Self::new(&body.username_or_email, &body.password)
    }
}

/// Body for `POST /api/v1/forgot-password`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordBody {
    #[schema(example = "ada@example.com")]
    pub email: String,
}

/// Body for `POST /api/v1/reset-password`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordBody {
    pub new_password: String,
    pub new_password_confirm: String,
    /// Token from the reset link.
    pub token: String,
}

impl From<&ResetPasswordBody> for ResetPasswordRequest {
    fn from(body: &ResetPasswordBody) -> Self {
        Self::new(&body.new_password, &body.new_password_confirm, &body.token)
    }
}

/// `{user}` on success, `{errors}` otherwise.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<UserSchema>)]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<FieldErrorSchema>>)]
    pub errors: Option<FieldErrors>,
}

impl From<AccountResult<User>> for UserResponse {
    fn from(result: AccountResult<User>) -> Self {
        match result {
            Ok(user) => Self {
                user: Some(user),
                errors: None,
            },
            Err(errors) => Self {
                user: None,
                errors: Some(errors),
            },
        }
    }
}

/// `{ok: true}` on success, `{errors}` otherwise.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OkResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<FieldErrorSchema>>)]
    pub errors: Option<FieldErrors>,
}

impl From<AccountResult<()>> for OkResponse {
    fn from(result: AccountResult<()>) -> Self {
        match result {
            Ok(()) => Self {
                ok: Some(true),
                errors: None,
            },
            Err(errors) => Self {
                ok: None,
                errors: Some(errors),
            },
        }
    }
}

/// `{ok}` for logout; `false` when the session could not be cleared.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    pub ok: bool,
}

/// `{user}` with `null` when no one is signed in.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    #[schema(value_type = Option<UserSchema>)]
    pub user: Option<User>,
}

/// Create an account and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterBody,
    responses(
        (status = 200, description = "Created user, or field errors", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie on success"))),
        (status = 400, description = "Malformed body", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterBody>,
) -> web::Json<UserResponse> {
    let request = RegisterRequest::from(&payload.into_inner());
    let result = state.accounts.register(request, &session).await;
    web::Json(result.into())
}

/// Sign in by username or email.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Signed-in user, or field errors", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie on success"))),
        (status = 400, description = "Malformed body", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginBody>,
) -> web::Json<UserResponse> {
    let request = LoginRequest::from(&payload.into_inner());
    let result = state.accounts.login(request, &session).await;
    web::Json(result.into())
}

/// Clear the session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 200, description = "Whether the session was cleared", body = LogoutResponse)
    ),
    tags = ["accounts"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(state: web::Data<HttpState>, session: SessionContext) -> web::Json<LogoutResponse> {
    let ok = state.accounts.logout(&session).await;
    web::Json(LogoutResponse { ok })
}

/// Email a password reset link.
#[utoipa::path(
    post,
    path = "/api/v1/forgot-password",
    request_body = ForgotPasswordBody,
    responses(
        (status = 200, description = "Link issued, or field errors", body = OkResponse),
        (status = 400, description = "Malformed body", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "forgotPassword",
    security([])
)]
#[post("/forgot-password")]
pub async fn forgot_password(
    state: web::Data<HttpState>,
    payload: web::Json<ForgotPasswordBody>,
) -> web::Json<OkResponse> {
    let request = ForgotPasswordRequest::new(&payload.email);
    let result = state.accounts.forgot_password(request).await;
    web::Json(result.into())
}

/// Redeem a reset token, set a new password and sign in.
#[utoipa::path(
    post,
    path = "/api/v1/reset-password",
    request_body = ResetPasswordBody,
    responses(
        (status = 200, description = "Updated user, or field errors", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie on success"))),
        (status = 400, description = "Malformed body", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "resetPassword",
    security([])
)]
#[post("/reset-password")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ResetPasswordBody>,
) -> web::Json<UserResponse> {
    let request = ResetPasswordRequest::from(&payload.into_inner());
    let result = state.accounts.reset_password(request, &session).await;
    web::Json(result.into())
}

/// Account bound to the session.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Signed-in user or null", body = MeResponse),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "User store unavailable", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "me"
)]
#[get("/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<MeResponse>> {
    let user = state.accounts.current_user(&session).await?;
    Ok(web::Json(MeResponse { user }))
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
