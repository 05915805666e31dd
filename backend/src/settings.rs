//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `ACCOUNTS_*` environment variables and
//! configuration files, in that order of precedence. A missing database or
//! Redis URL selects the in-memory adapter for that store.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{
    AccountPolicy, DEFAULT_MIN_PASSWORD_LENGTH, DEFAULT_RESET_LINK_BASE, DEFAULT_RESET_TOKEN_TTL,
    PasswordPolicy,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAIL_FROM: &str = "no-reply@localhost";
const DEFAULT_DB_POOL_SIZE: u32 = 10;

/// Settings that shape the server and the account policy.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ACCOUNTS")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL for the user store.
    pub database_url: Option<String>,
    /// Maximum pooled PostgreSQL connections.
    pub db_pool_max_size: Option<u32>,
    /// Redis URL for reset tokens.
    pub redis_url: Option<String>,
    /// Minimum password length in characters.
    pub password_min_length: Option<usize>,
    /// Require passwords to mix letters and digits.
    #[ortho_config(default = false)]
    pub password_require_letter_and_digit: bool,
    /// Reset token lifetime in seconds.
    pub reset_token_ttl_seconds: Option<u64>,
    /// Base URL reset links are built from; the token is appended as a path segment.
    pub reset_link_base: Option<String>,
    /// Answer forgot-password requests for unknown emails with success.
    #[ortho_config(default = false)]
    pub conceal_unknown_email: bool,
    /// HTTP mail relay endpoint. Reset emails are logged when unset.
    pub mail_relay_url: Option<String>,
    /// Sender address for outgoing mail.
    pub mail_from: Option<String>,
}

/// Setting values that failed to parse.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// `mail_relay_url` is not an absolute URL.
    #[error("invalid mail relay URL '{value}': {source}")]
    MailRelayUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

impl AppSettings {
    /// Listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Upper bound on pooled database connections, defaulting to 10.
    pub fn db_pool_max_size(&self) -> u32 {
        self.db_pool_max_size.unwrap_or(DEFAULT_DB_POOL_SIZE)
    }

    /// Sender address for reset emails.
    pub fn mail_from(&self) -> &str {
        self.mail_from.as_deref().unwrap_or(DEFAULT_MAIL_FROM)
    }

    /// Parsed relay endpoint, if one is configured.
    pub fn mail_relay_url(&self) -> Result<Option<url::Url>, SettingsError> {
        self.mail_relay_url
            .as_deref()
            .map(|value| {
                url::Url::parse(value).map_err(|source| SettingsError::MailRelayUrl {
                    value: value.to_owned(),
                    source,
                })
            })
            .transpose()
    }

    /// Account policy assembled from the settings.
    pub fn account_policy(&self) -> AccountPolicy {
        let passwords = PasswordPolicy::new(
            self.password_min_length
                .unwrap_or(DEFAULT_MIN_PASSWORD_LENGTH),
        )
        .with_letter_and_digit(self.password_require_letter_and_digit);
        let ttl = self
            .reset_token_ttl_seconds
            .map_or(DEFAULT_RESET_TOKEN_TTL, Duration::from_secs);
        AccountPolicy::default()
            .with_password_policy(passwords)
            .with_reset_token_ttl(ttl)
            .with_reset_link_base(
                self.reset_link_base
                    .as_deref()
                    .unwrap_or(DEFAULT_RESET_LINK_BASE),
            )
            .with_reveal_unknown_email(!self.conceal_unknown_email)
    }
}
