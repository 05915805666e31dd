//! Process-local `UserRepository` for development and tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, NewUserRecord, PasswordHash, User, UserAccount, UserId};

#[derive(Default)]
struct Accounts {
    last_id: i64,
    by_id: BTreeMap<i64, UserAccount>,
}

impl Accounts {
    fn find(&self, matches: impl Fn(&User) -> bool) -> Option<UserAccount> {
        self.by_id
            .values()
            .find(|account| matches(account.user()))
            .cloned()
    }
}

/// User store held in memory with the same uniqueness rules as the
/// PostgreSQL adapter.
pub struct InMemoryUserRepository {
    accounts: Mutex<Accounts>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl InMemoryUserRepository {
    /// Empty store stamping records with `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts: Mutex::new(Accounts::default()),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Accounts>, UserPersistenceError> {
        self.accounts
            .lock()
            .map_err(|_| UserPersistenceError::connection("user store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(self.lock()?.by_id.get(&id.get()).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(self.lock()?.find(|user| user.username().as_str() == username))
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(self.lock()?.find(|user| user.email().as_str() == email))
    }

    async fn find_by_username_or_email(
        &self,
        credential: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(self.lock()?.find(|user| {
            user.username().as_str() == credential || user.email().as_str() == credential
        }))
    }

    async fn create(&self, record: NewUserRecord) -> Result<User, UserPersistenceError> {
        let mut accounts = self.lock()?;
        if accounts
            .find(|user| user.username() == &record.username)
            .is_some()
        {
            return Err(UserPersistenceError::duplicate_username());
        }
        if accounts.find(|user| user.email() == &record.email).is_some() {
            return Err(UserPersistenceError::duplicate_email());
        }

        accounts.last_id += 1;
        let id = accounts.last_id;
        let now = self.clock.utc();
        let user = User::new(
            UserId::new(id),
            record.username,
            record.email,
            now,
            now,
        );
        accounts
            .by_id
            .insert(id, UserAccount::new(user.clone(), record.password_hash));
        Ok(user)
    }

    async fn update_password_by_email(
        &self,
        email: &EmailAddress,
        password_hash: PasswordHash,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut accounts = self.lock()?;
        let Some(existing) = accounts.find(|user| user.email() == email) else {
            return Ok(None);
        };
        let previous = existing.into_user();
        let user = User::new(
            previous.id(),
            previous.username().clone(),
            previous.email().clone(),
            previous.created_at(),
            self.clock.utc(),
        );
        accounts.by_id.insert(
            user.id().get(),
            UserAccount::new(user.clone(), password_hash),
        );
        Ok(Some(user))
    }
}
