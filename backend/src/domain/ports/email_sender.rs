//! Port for outbound email delivery.
use async_trait::async_trait;

use crate::domain::EmailAddress;

use super::define_port_error;

define_port_error! {
    /// Delivery failures reported by email adapters.
    pub enum EmailDeliveryError {
        /// The transport could not reach the relay.
        Transport { message: String } => "email transport failed: {message}",
        /// The relay refused the message.
        Rejected { message: String } => "email rejected: {message}",
    }
}

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient address.
    pub to: EmailAddress,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
}

/// Sends transactional email.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver `message`.
    async fn send(&self, message: EmailMessage) -> Result<(), EmailDeliveryError>;
}
