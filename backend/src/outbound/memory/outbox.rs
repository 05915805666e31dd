//! Email sender that keeps messages in memory.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::domain::ports::{EmailDeliveryError, EmailMessage, EmailSender};

/// Collects sent messages so callers can inspect them.
#[derive(Default)]
pub struct InMemoryOutbox {
    messages: Mutex<Vec<EmailMessage>>,
    delivered: Notify,
}

impl InMemoryOutbox {
    /// Messages sent so far, oldest first.
    pub fn messages(&self) -> Vec<EmailMessage> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    /// Wait until at least `count` messages have been sent.
    pub async fn wait_for(&self, count: usize) -> Vec<EmailMessage> {
        loop {
            let notified = self.delivered.notified();
            let messages = self.messages();
            if messages.len() >= count {
                return messages;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl EmailSender for InMemoryOutbox {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailDeliveryError> {
        self.messages
            .lock()
            .map_err(|_| EmailDeliveryError::transport("outbox lock poisoned"))?
            .push(message);
        self.delivered.notify_waiters();
        Ok(())
    }
}
