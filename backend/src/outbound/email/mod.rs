//! Outbound email adapters.
//!
//! - [`LogEmailSender`] writes messages to the log; the development default.
//! - [`HttpRelayEmailSender`] posts messages as JSON to an HTTP mail relay.

mod http_relay;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{EmailDeliveryError, EmailMessage, EmailSender};

pub use http_relay::HttpRelayEmailSender;

/// Email sender that logs each message instead of delivering it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailDeliveryError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.html_body,
            "email not delivered; logged instead"
        );
        Ok(())
    }
}
