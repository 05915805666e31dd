//! Reqwest-backed mail relay adapter.
//!
//! The relay accepts `POST` requests with a JSON body of
//! `{ "from", "to", "subject", "html" }` and answers 2xx once it has queued
//! the message.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use crate::domain::ports::{EmailDeliveryError, EmailMessage, EmailSender};

const PREVIEW_CHAR_LIMIT: usize = 160;

#[derive(Debug, Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Email sender posting to an HTTP relay endpoint.
pub struct HttpRelayEmailSender {
    client: Client,
    endpoint: Url,
    from: String,
}

impl HttpRelayEmailSender {
    /// Build a sender with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        from: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            from: from.into(),
        })
    }
}

#[async_trait]
impl EmailSender for HttpRelayEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailDeliveryError> {
        let payload = RelayPayload {
            from: self.from.as_str(),
            to: message.to.as_str(),
            subject: message.subject.as_str(),
            html: message.html_body.as_str(),
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|err| EmailDeliveryError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| EmailDeliveryError::transport(err.to_string()))?;
        Err(map_status_error(status, body.as_ref()))
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> EmailDeliveryError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    };
    if status.is_client_error() {
        EmailDeliveryError::rejected(message)
    } else {
        EmailDeliveryError::transport(message)
    }
}

fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
