//! Account lifecycle service implementing the [`AccountCommand`] driving port.
//!
//! Validation failures and store outages are both returned as
//! [`FieldErrors`]; outages are logged here and reported to callers with a
//! generic message on the field the operation is keyed by.
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};
use zeroize::Zeroizing;

use crate::domain::field_error::fields;
use crate::domain::ports::{
    AccountCommand, CredentialHasher, EmailMessage, EmailSender, ResetToken, ResetTokenStore,
    SessionHolder, UserPersistenceError, UserRepository,
};
use crate::domain::validation::{
    UniqueField, validate_correct_password, validate_email_exists, validate_email_format,
    validate_new_email, validate_new_passwords_match, validate_new_username,
    validate_password_strength, validate_username_format, validate_username_not_empty,
};
use crate::domain::{
    AccountResult, EmailAddress, Error, FieldError, FieldErrors, ForgotPasswordRequest,
    LoginRequest, NewUserRecord, PasswordHash, PasswordPolicy, RegisterRequest,
    ResetPasswordRequest, User, UserAccount, UserId, Username, spawn_traced,
};

/// Default lifetime of a password reset token.
pub const DEFAULT_RESET_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);

/// Default base URL reset links are built from.
pub const DEFAULT_RESET_LINK_BASE: &str = "http://localhost:3000/change-password";

/// Login lookup found no account for the credential.
pub const ACCOUNT_NOT_FOUND: &str = "that account does not exist";
/// Reset token is malformed, unknown or expired.
pub const TOKEN_EXPIRED: &str = "Token expired";
/// Reset token pointed at an account that has since gone.
pub const ACCOUNT_GONE: &str = "This account does not exist anymore";
/// A backing store failed; the caller may retry.
pub const TEMPORARILY_UNAVAILABLE: &str = "service temporarily unavailable, please try again";

/// Tunable behaviour of [`AccountService`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use accounts::domain::{AccountPolicy, PasswordPolicy};
///
/// let policy = AccountPolicy::default()
///     .with_password_policy(PasswordPolicy::new(12))
///     .with_reset_token_ttl(Duration::from_secs(60));
/// assert_eq!(policy.reset_token_ttl(), Duration::from_secs(60));
/// assert!(policy.reveal_unknown_email());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountPolicy {
    password_policy: PasswordPolicy,
    reset_token_ttl: Duration,
    reset_link_base: String,
    reveal_unknown_email: bool,
}

impl Default for AccountPolicy {
    fn default() -> Self {
        Self {
            password_policy: PasswordPolicy::default(),
            reset_token_ttl: DEFAULT_RESET_TOKEN_TTL,
            reset_link_base: DEFAULT_RESET_LINK_BASE.to_owned(),
            reveal_unknown_email: true,
        }
    }
}

impl AccountPolicy {
    /// Replace the password strength rules.
    #[must_use]
    pub fn with_password_policy(mut self, policy: PasswordPolicy) -> Self {
        self.password_policy = policy;
        self
    }

    /// Replace the reset token lifetime.
    #[must_use]
    pub fn with_reset_token_ttl(mut self, ttl: Duration) -> Self {
        self.reset_token_ttl = ttl;
        self
    }

    /// Replace the base URL of emailed reset links.
    #[must_use]
    pub fn with_reset_link_base(mut self, base: impl Into<String>) -> Self {
        self.reset_link_base = base.into();
        self
    }

    /// Choose whether forgot-password reports unknown emails.
    #[must_use]
    pub fn with_reveal_unknown_email(mut self, reveal: bool) -> Self {
        self.reveal_unknown_email = reveal;
        self
    }

    /// Password strength rules.
    pub fn password_policy(&self) -> &PasswordPolicy {
        &self.password_policy
    }

    /// Reset token lifetime.
    pub fn reset_token_ttl(&self) -> Duration {
        self.reset_token_ttl
    }

    /// Base URL of emailed reset links.
    pub fn reset_link_base(&self) -> &str {
        self.reset_link_base.as_str()
    }

    /// Whether forgot-password reports unknown emails.
    pub fn reveal_unknown_email(&self) -> bool {
        self.reveal_unknown_email
    }

    /// Reset link for `token`.
    pub fn reset_link(&self, token: &ResetToken) -> String {
        format!("{}/{token}", self.reset_link_base.trim_end_matches('/'))
    }
}

/// Account service wiring validators, the user store, the reset token store,
/// the mailer and the credential hasher.
pub struct AccountService<U: ?Sized, T: ?Sized, M: ?Sized, H: ?Sized> {
    users: Arc<U>,
    tokens: Arc<T>,
    mailer: Arc<M>,
    hasher: Arc<H>,
    policy: AccountPolicy,
}

impl<U: ?Sized, T: ?Sized, M: ?Sized, H: ?Sized> Clone for AccountService<U, T, M, H> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            tokens: Arc::clone(&self.tokens),
            mailer: Arc::clone(&self.mailer),
            hasher: Arc::clone(&self.hasher),
            policy: self.policy.clone(),
        }
    }
}

impl<U: ?Sized, T: ?Sized, M: ?Sized, H: ?Sized> AccountService<U, T, M, H> {
    /// Create a service over the given adapters.
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use accounts::domain::{AccountPolicy, AccountService};
    /// # use accounts::outbound::crypto::Argon2CredentialHasher;
    /// # use accounts::outbound::email::LogEmailSender;
    /// # use accounts::outbound::memory::{InMemoryResetTokenStore, InMemoryUserRepository};
    /// let service = AccountService::new(
    ///     Arc::new(InMemoryUserRepository::default()),
    ///     Arc::new(InMemoryResetTokenStore::default()),
    ///     Arc::new(LogEmailSender),
    ///     Arc::new(Argon2CredentialHasher::default()),
    ///     AccountPolicy::default(),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(
        users: Arc<U>,
        tokens: Arc<T>,
        mailer: Arc<M>,
        hasher: Arc<H>,
        policy: AccountPolicy,
    ) -> Self {
        Self {
            users,
            tokens,
            mailer,
            hasher,
            policy,
        }
    }

    /// Active policy.
    pub fn policy(&self) -> &AccountPolicy {
        &self.policy
    }
}

fn unavailable(field: &'static str, operation: &'static str, cause: impl fmt::Display) -> FieldErrors {
    error!(%cause, operation, "account store failure");
    FieldErrors::single(field, TEMPORARILY_UNAVAILABLE)
}

fn token_expired() -> FieldErrors {
    FieldErrors::single(fields::TOKEN, TOKEN_EXPIRED)
}

fn reset_email(to: EmailAddress, link: &str) -> EmailMessage {
    EmailMessage {
        to,
        subject: "Reset your password".to_owned(),
        html_body: format!("<a href=\"{link}\">reset password</a>"),
    }
}

/// Map user store failures onto transport-level errors for read paths.
pub(crate) fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername | UserPersistenceError::DuplicateEmail => {
            Error::conflict(error.to_string())
        }
    }
}

impl<U, T, M, H> AccountService<U, T, M, H>
where
    U: UserRepository + ?Sized + 'static,
    T: ResetTokenStore + ?Sized + 'static,
    M: EmailSender + ?Sized + 'static,
    H: CredentialHasher + ?Sized + 'static,
{
    fn bind_session(session: &dyn SessionHolder, user_id: UserId) {
        if let Err(err) = session.set_user_id(user_id) {
            warn!(error = %err, %user_id, "failed to bind session to user");
        }
    }

    /// Hash off the async executor; Argon2 is deliberately slow.
    async fn hash_password(&self, password: &str, field: &'static str) -> AccountResult<PasswordHash> {
        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(password.to_owned());
        match tokio::task::spawn_blocking(move || hasher.hash(&password)).await {
            Ok(Ok(hash)) => Ok(hash),
            Ok(Err(err)) => Err(unavailable(field, "hash_password", err)),
            Err(err) => Err(unavailable(field, "hash_password", err)),
        }
    }

    async fn check_password(&self, account: &UserAccount, candidate: &str) -> Option<FieldError> {
        let hasher = Arc::clone(&self.hasher);
        let stored = account.password_hash().clone();
        let candidate = Zeroizing::new(candidate.to_owned());
        let verification = tokio::task::spawn_blocking(move || {
            validate_correct_password(&stored, &candidate, &*hasher)
        })
        .await;
        match verification {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "password verification task failed");
                Some(FieldError::new(
                    fields::PASSWORD,
                    crate::domain::validation::INVALID_CREDENTIALS,
                ))
            }
        }
    }

    /// Collect every registration error, consulting the store only for
    /// well-formed values.
    async fn validate_registration(
        &self,
        request: &RegisterRequest,
    ) -> AccountResult<(Username, EmailAddress)> {
        let mut errors = FieldErrors::new();
        let username_error = validate_username_not_empty(request.username())
            .or_else(|| validate_username_format(request.username()));
        let email_error = validate_email_format(request.email());
        let username_ok = username_error.is_none();
        let email_ok = email_error.is_none();
        errors.push_some(username_error);
        errors.push_some(email_error);
        errors.push_some(validate_password_strength(
            request.password(),
            self.policy.password_policy(),
        ));

        if username_ok {
            let taken = validate_new_username(request.username(), &*self.users)
                .await
                .map_err(|err| unavailable(fields::USERNAME, "register", err))?;
            errors.push_some(taken);
        }
        if email_ok {
            let taken = validate_new_email(request.email(), &*self.users)
                .await
                .map_err(|err| unavailable(fields::EMAIL, "register", err))?;
            errors.push_some(taken);
        }
        errors.into_result(())?;

        let username = Username::new(request.username())
            .map_err(|err| FieldErrors::single(fields::USERNAME, err.to_string()))?;
        let email = EmailAddress::new(request.email())
            .map_err(|err| FieldErrors::single(fields::EMAIL, err.to_string()))?;
        Ok((username, email))
    }
}

#[async_trait(?Send)]
impl<U, T, M, H> AccountCommand for AccountService<U, T, M, H>
where
    U: UserRepository + ?Sized + 'static,
    T: ResetTokenStore + ?Sized + 'static,
    M: EmailSender + ?Sized + 'static,
    H: CredentialHasher + ?Sized + 'static,
{
    async fn register(
        &self,
        request: RegisterRequest,
        session: &dyn SessionHolder,
    ) -> AccountResult<User> {
        let (username, email) = self.validate_registration(&request).await?;
        let password_hash = self
            .hash_password(request.password(), fields::PASSWORD)
            .await?;

        let record = NewUserRecord {
            username,
            email,
            password_hash,
        };
        let user = match self.users.create(record).await {
            Ok(user) => user,
            Err(UserPersistenceError::DuplicateUsername) => {
                return Err(UniqueField::Username.taken().into());
            }
            Err(UserPersistenceError::DuplicateEmail) => {
                return Err(UniqueField::Email.taken().into());
            }
            Err(err) => return Err(unavailable(fields::USERNAME, "register", err)),
        };

        Self::bind_session(session, user.id());
        info!(user_id = %user.id(), "account registered");
        Ok(user)
    }

    async fn login(
        &self,
        request: LoginRequest,
        session: &dyn SessionHolder,
    ) -> AccountResult<User> {
        let account = self
            .users
            .find_by_username_or_email(request.username_or_email())
            .await
            .map_err(|err| unavailable(fields::USERNAME_OR_EMAIL, "login", err))?
            .ok_or_else(|| FieldErrors::single(fields::USERNAME_OR_EMAIL, ACCOUNT_NOT_FOUND))?;

        if let Some(rejected) = self.check_password(&account, request.password()).await {
            debug!(user_id = %account.user().id(), "login rejected");
            return Err(rejected.into());
        }

        let user = account.into_user();
        Self::bind_session(session, user.id());
        Ok(user)
    }

    async fn logout(&self, session: &dyn SessionHolder) -> bool {
        match session.destroy() {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "failed to destroy session");
                false
            }
        }
    }

    async fn forgot_password(&self, request: ForgotPasswordRequest) -> AccountResult<()> {
        let email = EmailAddress::new(request.email())
            .map_err(|err| FieldErrors::single(fields::EMAIL, err.to_string()))?;

        let unknown = validate_email_exists(email.as_str(), &*self.users)
            .await
            .map_err(|err| unavailable(fields::EMAIL, "forgot_password", err))?;
        if let Some(unknown) = unknown {
            if self.policy.reveal_unknown_email() {
                return Err(unknown.into());
            }
            debug!("password reset requested for unknown email");
            return Ok(());
        }

        let token = ResetToken::generate();
        self.tokens
            .put(&token.key(), email.as_str(), self.policy.reset_token_ttl())
            .await
            .map_err(|err| unavailable(fields::EMAIL, "forgot_password", err))?;

        let message = reset_email(email, &self.policy.reset_link(&token));
        let mailer = Arc::clone(&self.mailer);
        spawn_traced(async move {
            if let Err(err) = mailer.send(message).await {
                warn!(error = %err, "failed to deliver password reset email");
            }
        });
        Ok(())
    }

    async fn reset_password(
        &self,
        request: ResetPasswordRequest,
        session: &dyn SessionHolder,
    ) -> AccountResult<User> {
        let mut errors = FieldErrors::new();
        errors.push_some(validate_new_passwords_match(
            request.new_password(),
            request.new_password_confirm(),
        ));
        errors.push_some(
            validate_password_strength(request.new_password(), self.policy.password_policy())
                .map(|err| err.for_field(fields::NEW_PASSWORD)),
        );
        errors.into_result(())?;

        let key = ResetToken::parse(request.token())
            .map_err(|_| token_expired())?
            .key();
        // Consumed up front; a concurrent redemption of the same token reads
        // as expired.
        let stored = self
            .tokens
            .take(&key)
            .await
            .map_err(|err| unavailable(fields::TOKEN, "reset_password", err))?
            .ok_or_else(token_expired)?;
        let email = EmailAddress::new(stored).map_err(|err| {
            warn!(error = %err, "reset token holds a malformed email");
            token_expired()
        })?;

        let password_hash = self
            .hash_password(request.new_password(), fields::NEW_PASSWORD)
            .await?;
        let user = self
            .users
            .update_password_by_email(&email, password_hash)
            .await
            .map_err(|err| unavailable(fields::TOKEN, "reset_password", err))?
            .ok_or_else(|| FieldErrors::single(fields::TOKEN, ACCOUNT_GONE))?;

        Self::bind_session(session, user.id());
        info!(user_id = %user.id(), "password reset");
        Ok(user)
    }

    async fn current_user(&self, session: &dyn SessionHolder) -> Result<Option<User>, Error> {
        let user_id = session
            .user_id()
            .map_err(|err| Error::internal(format!("failed to read session: {err}")))?;
        let Some(user_id) = user_id else {
            return Ok(None);
        };
        let account = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_persistence_error)?;
        Ok(account.map(UserAccount::into_user))
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
