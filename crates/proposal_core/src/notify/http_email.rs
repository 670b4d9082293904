//! HTTP email API transport.
//!
//! # Responsibility
//! - Deliver the owner summary through a JSON email API
//!   (`POST {from, to, subject, text}` with bearer auth).
//!
//! # Invariants
//! - Every call is bounded by the configured request timeout.
//! - The API key never appears in log lines or error messages.

use super::{NotificationMessage, Notifier, NotifyError, NotifyResult};
use crate::config::HttpEmailConfig;
use crate::logging::sanitize_message;
use crate::model::response::ResponseRecord;
use reqwest::blocking::Client;
use serde::Serialize;

const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

/// Sends notifications to the proposal owner via an HTTP email API.
pub struct HttpEmailNotifier {
    client: Client,
    config: HttpEmailConfig,
}

impl HttpEmailNotifier {
    /// Builds the transport. Fails only when the HTTP client cannot be
    /// constructed (e.g. TLS backend initialization).
    pub fn new(config: HttpEmailConfig) -> NotifyResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("proposal_core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(NotifyError::Transport)?;
        Ok(Self { client, config })
    }
}

impl Notifier for HttpEmailNotifier {
    fn channel(&self) -> &str {
        "http_email"
    }

    fn notify(&self, record: &ResponseRecord) -> NotifyResult<()> {
        let message = NotificationMessage::for_record(record);
        let request = EmailRequest {
            from: &self.config.from,
            to: [self.config.owner_email.as_str()],
            subject: &message.subject,
            text: &message.body,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .map_err(NotifyError::Transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().unwrap_or_default();
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body: sanitize_message(&body, MAX_ERROR_BODY_CHARS),
        })
    }
}
