//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Uniqueness of usernames and emails is enforced by table constraints;
//! violations surface as the duplicate variants of [`UserPersistenceError`].

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, NewUserRecord, PasswordHash, User, UserAccount, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, PasswordUpdate, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn into_account(row: Option<UserRow>) -> Result<Option<UserAccount>, UserPersistenceError> {
    row.map(UserRow::into_account).transpose()
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::id.eq(id.get()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        into_account(row)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        into_account(row)
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        into_account(row)
    }

    async fn find_by_username_or_email(
        &self,
        credential: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        // Usernames cannot contain '@', so at most one row can match.
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(
                users::username
                    .eq(credential)
                    .or(users::email.eq(credential)),
            )
            .order(users::id.asc())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        into_account(row)
    }

    async fn create(&self, record: NewUserRecord) -> Result<User, UserPersistenceError> {
        let new_row = NewUserRow {
            username: record.username.as_str(),
            email: record.email.as_str(),
            password_hash: record.password_hash.as_str(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row.into_account()?.into_user())
    }

    async fn update_password_by_email(
        &self,
        email: &EmailAddress,
        password_hash: PasswordHash,
    ) -> Result<Option<User>, UserPersistenceError> {
        let changes = PasswordUpdate {
            password_hash: password_hash.as_str(),
            updated_at: Utc::now(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(users::table.filter(users::email.eq(email.as_str())))
            .set(&changes)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(into_account(row)?.map(UserAccount::into_user))
    }
}
