//! Redis-backed reset token store.
//!
//! Keys are written with `SET key email EX ttl`, so Redis owns expiry and a
//! lapsed token simply reads back as absent. Redemption uses `GETDEL` so only
//! one caller receives a given token. Connections are pooled with
//! `bb8-redis`.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::{RedisConnectionManager, bb8, redis};
use tracing::debug;

use crate::domain::ports::{ResetTokenKey, ResetTokenStore, ResetTokenStoreError};

/// Reset token store backed by a pooled Redis connection.
#[derive(Clone)]
pub struct RedisResetTokenStore {
    pool: bb8::Pool<RedisConnectionManager>,
}

impl RedisResetTokenStore {
    /// Connect to `redis_url` and build a pool.
    ///
    /// # Errors
    ///
    /// Returns [`ResetTokenStoreError::Backend`] when the URL is invalid or
    /// the initial connection fails.
    pub async fn connect(redis_url: &str) -> Result<Self, ResetTokenStoreError> {
        let manager = RedisConnectionManager::new(redis_url).map_err(map_redis_error)?;
        let pool = bb8::Pool::builder()
            .build(manager)
            .await
            .map_err(map_redis_error)?;
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: bb8::Pool<RedisConnectionManager>) -> Self {
        Self { pool }
    }

    async fn connection(
        &self,
    ) -> Result<bb8::PooledConnection<'_, RedisConnectionManager>, ResetTokenStoreError> {
        self.pool
            .get()
            .await
            .map_err(|err| ResetTokenStoreError::backend(format!("redis checkout failed: {err}")))
    }
}

fn map_redis_error(error: redis::RedisError) -> ResetTokenStoreError {
    debug!(kind = ?error.kind(), "redis operation failed");
    ResetTokenStoreError::backend(error.to_string())
}

/// Whole seconds for `EX`; Redis rejects zero.
fn expiry_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl ResetTokenStore for RedisResetTokenStore {
    async fn put(
        &self,
        key: &ResetTokenKey,
        email: &str,
        ttl: Duration,
    ) -> Result<(), ResetTokenStoreError> {
        let mut conn = self.connection().await?;
        redis::cmd("SET")
            .arg(key.as_str())
            .arg(email)
            .arg("EX")
            .arg(expiry_seconds(ttl))
            .query_async::<()>(&mut *conn)
            .await
            .map_err(map_redis_error)
    }

    async fn get(&self, key: &ResetTokenKey) -> Result<Option<String>, ResetTokenStoreError> {
        let mut conn = self.connection().await?;
        redis::cmd("GET")
            .arg(key.as_str())
            .query_async::<Option<String>>(&mut *conn)
            .await
            .map_err(map_redis_error)
    }

    async fn take(&self, key: &ResetTokenKey) -> Result<Option<String>, ResetTokenStoreError> {
        let mut conn = self.connection().await?;
        redis::cmd("GETDEL")
            .arg(key.as_str())
            .query_async::<Option<String>>(&mut *conn)
            .await
            .map_err(map_redis_error)
    }

    async fn delete(&self, key: &ResetTokenKey) -> Result<(), ResetTokenStoreError> {
        let mut conn = self.connection().await?;
        let removed = redis::cmd("DEL")
            .arg(key.as_str())
            .query_async::<i64>(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        debug!(removed, "reset token deleted");
        Ok(())
    }
}
