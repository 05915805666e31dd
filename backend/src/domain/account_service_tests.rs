//! Tests for the account service.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};
use tokio::sync::mpsc;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    EmailDeliveryError, MockCredentialHasher, MockResetTokenStore, MockSessionHolder,
    MockUserRepository, RESET_TOKEN_PREFIX, ResetTokenStoreError, SessionError,
};
use crate::domain::validation::INVALID_CREDENTIALS;

struct RecordingMailer {
    sent: mpsc::UnboundedSender<EmailMessage>,
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailDeliveryError> {
        self.sent
            .send(message)
            .map_err(|_| EmailDeliveryError::transport("outbox closed"))
    }
}

type TestService =
    AccountService<MockUserRepository, MockResetTokenStore, RecordingMailer, MockCredentialHasher>;

struct Harness {
    users: MockUserRepository,
    tokens: MockResetTokenStore,
    hasher: MockCredentialHasher,
    policy: AccountPolicy,
}

impl Harness {
    fn new() -> Self {
        Self {
            users: MockUserRepository::new(),
            tokens: MockResetTokenStore::new(),
            hasher: MockCredentialHasher::new(),
            policy: AccountPolicy::default(),
        }
    }

    fn build(self) -> (TestService, mpsc::UnboundedReceiver<EmailMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = AccountService::new(
            Arc::new(self.users),
            Arc::new(self.tokens),
            Arc::new(RecordingMailer { sent: tx }),
            Arc::new(self.hasher),
            self.policy,
        );
        (service, rx)
    }
}

fn user(id: i64, username: &str, email: &str) -> User {
    let at = Utc
        .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
        .single()
        .expect("valid timestamp");
    User::new(
        UserId::new(id),
        Username::new(username).expect("valid username"),
        EmailAddress::new(email).expect("valid email"),
        at,
        at,
    )
}

#[fixture]
fn ada() -> UserAccount {
    UserAccount::new(
        user(1, "ada", "ada@example.com"),
        PasswordHash::new("hashed:secret-pass").expect("non-empty hash"),
    )
}

fn hashing(hasher: &mut MockCredentialHasher) {
    hasher.expect_hash().returning(|password| {
        Ok(PasswordHash::new(format!("hashed:{password}")).expect("non-empty hash"))
    });
}

fn binds(session: &mut MockSessionHolder, id: i64) {
    session
        .expect_set_user_id()
        .withf(move |user_id| *user_id == UserId::new(id))
        .times(1)
        .returning(|_| Ok(()));
}

fn field_names(errors: &FieldErrors) -> Vec<&str> {
    errors.iter().map(FieldError::field).collect()
}

#[rstest]
#[tokio::test]
async fn register_creates_account_and_binds_session() {
    let mut harness = Harness::new();
    harness
        .users
        .expect_find_by_username()
        .return_once(|_| Ok(None));
    harness.users.expect_find_by_email().return_once(|_| Ok(None));
    harness
        .users
        .expect_create()
        .withf(|record| {
            record.username.as_str() == "ada"
                && record.email.as_str() == "ada@example.com"
                && record.password_hash.as_str() == "hashed:secret-pass"
        })
        .times(1)
        .return_once(|_| Ok(user(1, "ada", "ada@example.com")));
    hashing(&mut harness.hasher);
    let (service, _outbox) = harness.build();
    let mut session = MockSessionHolder::new();
    binds(&mut session, 1);

    let created = service
        .register(
            RegisterRequest::new(" ada ", "ada@example.com", "secret-pass"),
            &session,
        )
        .await
        .expect("registration succeeds");

    assert_eq!(created.username().as_str(), "ada");
}

#[rstest]
#[tokio::test]
async fn register_collects_format_errors_without_touching_store() {
    let (service, _outbox) = Harness::new().build();
    let session = MockSessionHolder::new();

    let errors = service
        .register(RegisterRequest::new("ab", "nope", "short"), &session)
        .await
        .expect_err("invalid input");

    assert_eq!(field_names(&errors), vec!["username", "email", "password"]);
}

#[rstest]
#[case("", "username must not be empty")]
#[case("a@b", "username cannot include an @")]
#[tokio::test]
async fn register_reports_one_username_error(#[case] username: &str, #[case] message: &str) {
    let mut harness = Harness::new();
    harness.users.expect_find_by_email().return_once(|_| Ok(None));
    let (service, _outbox) = harness.build();

    let errors = service
        .register(
            RegisterRequest::new(username, "ada@example.com", "secret-pass"),
            &MockSessionHolder::new(),
        )
        .await
        .expect_err("invalid username");

    assert_eq!(errors.into_vec(), vec![FieldError::new("username", message)]);
}

#[rstest]
#[tokio::test]
async fn register_reports_taken_username_and_email(ada: UserAccount) {
    let mut harness = Harness::new();
    let by_email = ada.clone();
    harness
        .users
        .expect_find_by_username()
        .return_once(move |_| Ok(Some(ada)));
    harness
        .users
        .expect_find_by_email()
        .return_once(move |_| Ok(Some(by_email)));
    harness.users.expect_create().never();
    let (service, _outbox) = harness.build();

    let errors = service
        .register(
            RegisterRequest::new("ada", "ada@example.com", "secret-pass"),
            &MockSessionHolder::new(),
        )
        .await
        .expect_err("duplicates");

    assert_eq!(
        errors.into_vec(),
        vec![
            FieldError::new("username", "username already taken"),
            FieldError::new("email", "email already taken"),
        ]
    );
}

#[rstest]
#[case(UserPersistenceError::DuplicateUsername, "username")]
#[case(UserPersistenceError::DuplicateEmail, "email")]
#[tokio::test]
async fn register_maps_constraint_violations_from_create(
    #[case] violation: UserPersistenceError,
    #[case] field: &str,
) {
    let mut harness = Harness::new();
    harness
        .users
        .expect_find_by_username()
        .return_once(|_| Ok(None));
    harness.users.expect_find_by_email().return_once(|_| Ok(None));
    harness
        .users
        .expect_create()
        .return_once(move |_| Err(violation));
    hashing(&mut harness.hasher);
    let (service, _outbox) = harness.build();

    let errors = service
        .register(
            RegisterRequest::new("ada", "ada@example.com", "secret-pass"),
            &MockSessionHolder::new(),
        )
        .await
        .expect_err("race lost");

    assert_eq!(field_names(&errors), vec![field]);
}

#[rstest]
#[tokio::test]
async fn register_reports_store_outage_generically() {
    let mut harness = Harness::new();
    harness
        .users
        .expect_find_by_username()
        .return_once(|_| Err(UserPersistenceError::connection("refused")));
    let (service, _outbox) = harness.build();

    let errors = service
        .register(
            RegisterRequest::new("ada", "ada@example.com", "secret-pass"),
            &MockSessionHolder::new(),
        )
        .await
        .expect_err("outage");

    assert_eq!(
        errors.into_vec(),
        vec![FieldError::new("username", TEMPORARILY_UNAVAILABLE)]
    );
}

#[rstest]
#[tokio::test]
async fn login_reports_unknown_credential_on_credential_field() {
    let mut harness = Harness::new();
    harness
        .users
        .expect_find_by_username_or_email()
        .withf(|credential| credential == "ghost")
        .return_once(|_| Ok(None));
    let (service, _outbox) = harness.build();

    let errors = service
        .login(LoginRequest::new("ghost", "whatever"), &MockSessionHolder::new())
        .await
        .expect_err("unknown account");

    assert_eq!(
        errors.into_vec(),
        vec![FieldError::new("usernameOrEmail", ACCOUNT_NOT_FOUND)]
    );
}

#[rstest]
#[tokio::test]
async fn login_rejects_wrong_password_without_binding(ada: UserAccount) {
    let mut harness = Harness::new();
    harness
        .users
        .expect_find_by_username_or_email()
        .return_once(move |_| Ok(Some(ada)));
    harness.hasher.expect_verify().return_const(false);
    let (service, _outbox) = harness.build();
    let mut session = MockSessionHolder::new();
    session.expect_set_user_id().never();

    let errors = service
        .login(LoginRequest::new("ada", "wrong-pass"), &session)
        .await
        .expect_err("wrong password");

    assert_eq!(
        errors.into_vec(),
        vec![FieldError::new("password", INVALID_CREDENTIALS)]
    );
}

#[rstest]
#[case("ada")]
#[case("ada@example.com")]
#[tokio::test]
async fn login_binds_session_for_either_credential(ada: UserAccount, #[case] credential: &str) {
    let mut harness = Harness::new();
    harness
        .users
        .expect_find_by_username_or_email()
        .return_once(move |_| Ok(Some(ada)));
    harness
        .hasher
        .expect_verify()
        .withf(|stored, candidate| stored.as_str() == "hashed:secret-pass" && candidate == "secret-pass")
        .return_const(true);
    let (service, _outbox) = harness.build();
    let mut session = MockSessionHolder::new();
    binds(&mut session, 1);

    let logged_in = service
        .login(LoginRequest::new(credential, "secret-pass"), &session)
        .await
        .expect("login succeeds");

    assert_eq!(logged_in.id(), UserId::new(1));
}

#[rstest]
#[case(Ok(()), true)]
#[case(Err(SessionError::store("cookie jar locked")), false)]
#[tokio::test]
async fn logout_reports_whether_session_was_destroyed(
    #[case] outcome: Result<(), SessionError>,
    #[case] expected: bool,
) {
    let (service, _outbox) = Harness::new().build();
    let mut session = MockSessionHolder::new();
    session.expect_destroy().times(1).return_once(move || outcome);

    assert_eq!(service.logout(&session).await, expected);
}

#[rstest]
#[tokio::test]
async fn forgot_password_rejects_malformed_email_before_lookup() {
    let (service, _outbox) = Harness::new().build();

    let errors = service
        .forgot_password(ForgotPasswordRequest::new("not-an-email"))
        .await
        .expect_err("malformed");

    assert_eq!(errors.into_vec(), vec![FieldError::new("email", "invalid email")]);
}

#[rstest]
#[case(true)]
#[case(false)]
#[tokio::test]
async fn forgot_password_unknown_email_follows_policy(#[case] reveal: bool) {
    let mut harness = Harness::new();
    harness.users.expect_find_by_email().return_once(|_| Ok(None));
    harness.tokens.expect_put().never();
    harness.policy = AccountPolicy::default().with_reveal_unknown_email(reveal);
    let (service, _outbox) = harness.build();

    let result = service
        .forgot_password(ForgotPasswordRequest::new("ghost@example.com"))
        .await;

    if reveal {
        let errors = result.expect_err("unknown email revealed");
        assert_eq!(field_names(&errors), vec!["email"]);
    } else {
        assert_eq!(result, Ok(()));
    }
}

#[rstest]
#[tokio::test]
async fn forgot_password_stores_token_and_emails_link(ada: UserAccount) {
    let mut harness = Harness::new();
    harness
        .users
        .expect_find_by_email()
        .return_once(move |_| Ok(Some(ada)));
    let stored_key = Arc::new(Mutex::new(None::<String>));
    let capture = Arc::clone(&stored_key);
    harness
        .tokens
        .expect_put()
        .withf(|key, email, ttl| {
            key.as_str().starts_with(RESET_TOKEN_PREFIX)
                && email == "ada@example.com"
                && *ttl == Duration::from_secs(900)
        })
        .times(1)
        .returning(move |key, _, _| {
            *capture.lock().expect("capture lock") = Some(key.as_str().to_owned());
            Ok(())
        });
    harness.policy = AccountPolicy::default().with_reset_link_base("https://app.test/reset/");
    let (service, mut outbox) = harness.build();

    service
        .forgot_password(ForgotPasswordRequest::new("ada@example.com"))
        .await
        .expect("reset issued");

    let message = tokio::time::timeout(Duration::from_secs(1), outbox.recv())
        .await
        .expect("email sent in time")
        .expect("email delivered");
    let key = stored_key
        .lock()
        .expect("capture lock")
        .clone()
        .expect("token stored");
    let token = key
        .strip_prefix(RESET_TOKEN_PREFIX)
        .expect("prefixed key");
    assert_eq!(message.to.as_str(), "ada@example.com");
    assert!(
        message
            .html_body
            .contains(&format!("https://app.test/reset/{token}")),
        "unexpected body: {}",
        message.html_body
    );
}

#[rstest]
#[tokio::test]
async fn forgot_password_reports_token_store_outage(ada: UserAccount) {
    let mut harness = Harness::new();
    harness
        .users
        .expect_find_by_email()
        .return_once(move |_| Ok(Some(ada)));
    harness
        .tokens
        .expect_put()
        .return_once(|_, _, _| Err(ResetTokenStoreError::backend("redis down")));
    let (service, _outbox) = harness.build();

    let errors = service
        .forgot_password(ForgotPasswordRequest::new("ada@example.com"))
        .await
        .expect_err("outage");

    assert_eq!(
        errors.into_vec(),
        vec![FieldError::new("email", TEMPORARILY_UNAVAILABLE)]
    );
}

#[rstest]
#[case("new-secret", "other-secret", "newPasswordConfirm")]
#[case("short", "short", "newPassword")]
#[tokio::test]
async fn reset_password_validates_before_reading_token(
    #[case] password: &str,
    #[case] confirm: &str,
    #[case] field: &str,
) {
    let mut harness = Harness::new();
    harness.tokens.expect_take().never();
    let token = ResetToken::generate().to_string();
    let (service, _outbox) = harness.build();

    let errors = service
        .reset_password(
            ResetPasswordRequest::new(password, confirm, &token),
            &MockSessionHolder::new(),
        )
        .await
        .expect_err("invalid passwords");

    assert_eq!(field_names(&errors), vec![field]);
}

#[rstest]
#[tokio::test]
async fn reset_password_treats_malformed_token_as_expired() {
    let mut harness = Harness::new();
    harness.tokens.expect_take().never();
    let (service, _outbox) = harness.build();

    let errors = service
        .reset_password(
            ResetPasswordRequest::new("new-secret", "new-secret", "garbage"),
            &MockSessionHolder::new(),
        )
        .await
        .expect_err("bad token");

    assert_eq!(errors.into_vec(), vec![FieldError::new("token", TOKEN_EXPIRED)]);
}

#[rstest]
#[tokio::test]
async fn reset_password_reports_missing_token_as_expired() {
    let mut harness = Harness::new();
    harness.tokens.expect_take().return_once(|_| Ok(None));
    harness.users.expect_update_password_by_email().never();
    let token = ResetToken::generate().to_string();
    let (service, _outbox) = harness.build();

    let errors = service
        .reset_password(
            ResetPasswordRequest::new("new-secret", "new-secret", &token),
            &MockSessionHolder::new(),
        )
        .await
        .expect_err("expired token");

    assert_eq!(errors.into_vec(), vec![FieldError::new("token", TOKEN_EXPIRED)]);
}

#[rstest]
#[tokio::test]
async fn reset_password_updates_hash_and_consumes_token() {
    let token = ResetToken::generate();
    let expected_key = token.key();
    let mut harness = Harness::new();
    harness
        .tokens
        .expect_take()
        .withf(move |key| *key == expected_key)
        .times(1)
        .return_once(|_| Ok(Some("ada@example.com".to_owned())));
    harness.tokens.expect_get().never();
    harness
        .users
        .expect_update_password_by_email()
        .withf(|email, hash| {
            email.as_str() == "ada@example.com" && hash.as_str() == "hashed:new-secret"
        })
        .times(1)
        .return_once(|_, _| Ok(Some(user(1, "ada", "ada@example.com"))));
    hashing(&mut harness.hasher);
    let (service, _outbox) = harness.build();
    let mut session = MockSessionHolder::new();
    binds(&mut session, 1);

    let updated = service
        .reset_password(
            ResetPasswordRequest::new("new-secret", "new-secret", &token.to_string()),
            &session,
        )
        .await
        .expect("reset succeeds");

    assert_eq!(updated.email().as_str(), "ada@example.com");
}

#[rstest]
#[tokio::test]
async fn reset_password_reports_vanished_account() {
    let mut harness = Harness::new();
    harness
        .tokens
        .expect_take()
        .return_once(|_| Ok(Some("gone@example.com".to_owned())));
    harness
        .users
        .expect_update_password_by_email()
        .return_once(|_, _| Ok(None));
    hashing(&mut harness.hasher);
    let token = ResetToken::generate().to_string();
    let (service, _outbox) = harness.build();
    let mut session = MockSessionHolder::new();
    session.expect_set_user_id().never();

    let errors = service
        .reset_password(
            ResetPasswordRequest::new("new-secret", "new-secret", &token),
            &session,
        )
        .await
        .expect_err("account gone");

    assert_eq!(errors.into_vec(), vec![FieldError::new("token", ACCOUNT_GONE)]);
}

#[rstest]
#[tokio::test]
async fn current_user_is_none_without_session_binding() {
    let (service, _outbox) = Harness::new().build();
    let mut session = MockSessionHolder::new();
    session.expect_user_id().return_once(|| Ok(None));

    let current = service.current_user(&session).await.expect("lookup succeeds");
    assert!(current.is_none());
}

#[rstest]
#[tokio::test]
async fn current_user_loads_bound_account(ada: UserAccount) {
    let mut harness = Harness::new();
    harness
        .users
        .expect_find_by_id()
        .withf(|id| *id == UserId::new(1))
        .return_once(move |_| Ok(Some(ada)));
    let (service, _outbox) = harness.build();
    let mut session = MockSessionHolder::new();
    session
        .expect_user_id()
        .return_once(|| Ok(Some(UserId::new(1))));

    let current = service
        .current_user(&session)
        .await
        .expect("lookup succeeds")
        .expect("bound user");
    assert_eq!(current.username().as_str(), "ada");
}

#[rstest]
#[case(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(UserPersistenceError::query("bad sql"), ErrorCode::InternalError)]
#[tokio::test]
async fn current_user_maps_store_failures(
    #[case] failure: UserPersistenceError,
    #[case] code: ErrorCode,
) {
    let mut harness = Harness::new();
    harness
        .users
        .expect_find_by_id()
        .return_once(move |_| Err(failure));
    let (service, _outbox) = harness.build();
    let mut session = MockSessionHolder::new();
    session
        .expect_user_id()
        .return_once(|| Ok(Some(UserId::new(1))));

    let error = service.current_user(&session).await.expect_err("store failure");
    assert_eq!(error.code(), code);
}

#[rstest]
fn reset_link_joins_base_and_token() {
    let token = ResetToken::generate();
    let policy = AccountPolicy::default().with_reset_link_base("https://app.test/reset///");
    assert_eq!(policy.reset_link(&token), format!("https://app.test/reset/{token}"));
}
