//! Builders selecting adapters for the account service.
//!
//! Each store falls back to its in-memory adapter when no URL is configured,
//! so the server runs without PostgreSQL or Redis during development.

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::{Context, Result};
use tracing::{info, warn};

use accounts::domain::AccountService;
use accounts::domain::ports::{AccountCommand, EmailSender, ResetTokenStore, UserRepository};
use accounts::outbound::cache::RedisResetTokenStore;
use accounts::outbound::crypto::Argon2CredentialHasher;
use accounts::outbound::email::{HttpRelayEmailSender, LogEmailSender};
use accounts::outbound::memory::{InMemoryResetTokenStore, InMemoryUserRepository};
use accounts::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig, run_migrations};
use accounts::settings::AppSettings;

const MAIL_RELAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Migrate the database and return a Diesel-backed repository, or the
/// in-memory one when `database_url` is unset.
async fn build_user_repository(settings: &AppSettings) -> Result<Arc<dyn UserRepository>> {
    let Some(url) = settings.database_url.as_deref() else {
        warn!("no database configured; accounts are kept in memory");
        return Ok(Arc::new(InMemoryUserRepository::default()));
    };
    run_migrations(url)
        .await
        .wrap_err("failed to apply database migrations")?;
    let config = PoolConfig::new(url).with_max_size(settings.db_pool_max_size());
    let pool = DbPool::new(config)
        .await
        .wrap_err("failed to build database pool")?;
    info!(max_size = settings.db_pool_max_size(), "database pool ready");
    Ok(Arc::new(DieselUserRepository::new(pool)))
}

async fn build_reset_token_store(settings: &AppSettings) -> Result<Arc<dyn ResetTokenStore>> {
    match settings.redis_url.as_deref() {
        Some(url) => {
            let store = RedisResetTokenStore::connect(url)
                .await
                .wrap_err("failed to connect to Redis")?;
            info!("redis reset token store ready");
            Ok(Arc::new(store))
        }
        None => {
            warn!("no redis configured; reset tokens are kept in memory");
            Ok(Arc::new(InMemoryResetTokenStore::default()))
        }
    }
}

fn build_email_sender(settings: &AppSettings) -> Result<Arc<dyn EmailSender>> {
    match settings.mail_relay_url()? {
        Some(endpoint) => {
            let sender = HttpRelayEmailSender::new(endpoint, settings.mail_from(), MAIL_RELAY_TIMEOUT)
                .wrap_err("failed to build mail relay client")?;
            Ok(Arc::new(sender))
        }
        None => {
            warn!("no mail relay configured; reset emails are logged");
            Ok(Arc::new(LogEmailSender))
        }
    }
}

/// Assemble the account service from the configured adapters.
pub async fn build_account_service(
    settings: &AppSettings,
) -> Result<Arc<dyn AccountCommand>> {
    let users = build_user_repository(settings).await?;
    let tokens = build_reset_token_store(settings).await?;
    let mailer = build_email_sender(settings)?;
    let service = AccountService::new(
        users,
        tokens,
        mailer,
        Arc::new(Argon2CredentialHasher::default()),
        settings.account_policy(),
    );
    Ok(Arc::new(service))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn bare_settings() -> AppSettings {
        AppSettings {
            bind_addr: None,
            database_url: None,
            db_pool_max_size: None,
            redis_url: None,
            password_min_length: None,
            password_require_letter_and_digit: false,
            reset_token_ttl_seconds: None,
            reset_link_base: None,
            conceal_unknown_email: false,
            mail_relay_url: None,
            mail_from: None,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn unset_urls_select_in_memory_adapters(bare_settings: AppSettings) {
        let users = build_user_repository(&bare_settings).await.expect("users");
        let found = users
            .find_by_email("ada@example.com")
            .await
            .expect("in-memory lookup");
        assert!(found.is_none());
        assert!(build_reset_token_store(&bare_settings).await.is_ok());
        assert!(build_email_sender(&bare_settings).is_ok());
    }

    #[rstest]
    fn relay_url_selects_http_sender(mut bare_settings: AppSettings) {
        bare_settings.mail_relay_url = Some("https://relay.example.com/send".to_owned());
        assert!(build_email_sender(&bare_settings).is_ok());
    }

    #[rstest]
    fn malformed_relay_url_fails_startup(mut bare_settings: AppSettings) {
        bare_settings.mail_relay_url = Some("not a url".to_owned());
        assert!(build_email_sender(&bare_settings).is_err());
    }
}
