//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::users;
use crate::domain::ports::UserPersistenceError;
use crate::domain::{EmailAddress, PasswordHash, User, UserAccount, UserId, Username};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    /// Rebuild the domain account, rejecting rows that break domain rules.
    pub(crate) fn into_account(self) -> Result<UserAccount, UserPersistenceError> {
        let invalid = |err: crate::domain::UserValidationError| {
            UserPersistenceError::query(format!("stored user {} is invalid: {err}", self.id))
        };
        let username = Username::new(self.username.as_str()).map_err(invalid)?;
        let email = EmailAddress::new(self.email.as_str()).map_err(invalid)?;
        let password_hash = PasswordHash::new(self.password_hash.as_str()).map_err(invalid)?;
        let user = User::new(
            UserId::new(self.id),
            username,
            email,
            self.created_at,
            self.updated_at,
        );
        Ok(UserAccount::new(user, password_hash))
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Changeset applied when a password is reset.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct PasswordUpdate<'a> {
    pub password_hash: &'a str,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn row(username: &str, email: &str) -> UserRow {
        let now = Utc::now();
        UserRow {
            id: 7,
            username: username.to_owned(),
            email: email.to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn valid_row_maps_to_account() {
        let account = row("ada", "ada@example.com")
            .into_account()
            .expect("valid row");
        assert_eq!(account.user().id(), UserId::new(7));
        assert_eq!(account.password_hash().as_str(), "$argon2id$stub");
    }

    #[rstest]
    #[case("ab", "ada@example.com")]
    #[case("ada", "not-an-email")]
    fn invalid_row_is_a_query_error(#[case] username: &str, #[case] email: &str) {
        let error = row(username, email)
            .into_account()
            .expect_err("invalid row");
        assert!(matches!(error, UserPersistenceError::Query { .. }));
    }
}
