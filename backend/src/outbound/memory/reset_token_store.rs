//! Process-local `ResetTokenStore` with clock-driven expiry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{ResetTokenKey, ResetTokenStore, ResetTokenStoreError};

struct Entry {
    email: String,
    expires_at: DateTime<Utc>,
}

/// Reset token store held in memory.
///
/// Expired entries are dropped lazily when read.
pub struct InMemoryResetTokenStore {
    entries: Mutex<HashMap<ResetTokenKey, Entry>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryResetTokenStore {
    fn default() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl InMemoryResetTokenStore {
    /// Empty store measuring expiry against `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<ResetTokenKey, Entry>>, ResetTokenStoreError> {
        self.entries
            .lock()
            .map_err(|_| ResetTokenStoreError::backend("reset token store lock poisoned"))
    }
}

#[async_trait]
impl ResetTokenStore for InMemoryResetTokenStore {
    async fn put(
        &self,
        key: &ResetTokenKey,
        email: &str,
        ttl: Duration,
    ) -> Result<(), ResetTokenStoreError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|err| ResetTokenStoreError::serialization(format!("ttl out of range: {err}")))?;
        let entry = Entry {
            email: email.to_owned(),
            expires_at: self.clock.utc() + ttl,
        };
        self.lock()?.insert(key.clone(), entry);
        Ok(())
    }

    async fn get(&self, key: &ResetTokenKey) -> Result<Option<String>, ResetTokenStoreError> {
        let now = self.clock.utc();
        let mut entries = self.lock()?;
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.email.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn take(&self, key: &ResetTokenKey) -> Result<Option<String>, ResetTokenStoreError> {
        let now = self.clock.utc();
        let removed = self.lock()?.remove(key);
        Ok(removed
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.email))
    }

    async fn delete(&self, key: &ResetTokenKey) -> Result<(), ResetTokenStoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}
