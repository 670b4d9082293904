//! Out-of-band owner notification.
//!
//! # Responsibility
//! - Define the single `notify(record)` capability the service depends on.
//! - Provide interchangeable transports selected by configuration.
//!
//! # Invariants
//! - Notifiers only read the persisted record; they never write to the store.
//! - Notification failure is reported to the caller, which decides whether it
//!   is fatal. The response service treats it as non-fatal.

mod http_email;
mod message;

pub use http_email::HttpEmailNotifier;
pub use message::NotificationMessage;

use crate::config::NotifierConfig;
use crate::model::response::ResponseRecord;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type NotifyResult<T> = Result<T, NotifyError>;

/// Delivery-channel failure.
#[derive(Debug)]
pub enum NotifyError {
    /// Request could not be sent or timed out.
    Transport(reqwest::Error),
    /// Channel answered with a non-success status.
    Rejected { status: u16, body: String },
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) if err.is_timeout() => write!(f, "notification timed out"),
            Self::Transport(err) => write!(f, "notification transport failed: {err}"),
            Self::Rejected { status, body } => {
                write!(f, "notification rejected with status {status}: {body}")
            }
        }
    }
}

impl Error for NotifyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Rejected { .. } => None,
        }
    }
}

/// Sends a summary of a persisted response to the proposal owner.
pub trait Notifier: Send + Sync {
    /// Short channel name for log lines.
    fn channel(&self) -> &str;
    fn notify(&self, record: &ResponseRecord) -> NotifyResult<()>;
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn channel(&self) -> &str {
        (**self).channel()
    }

    fn notify(&self, record: &ResponseRecord) -> NotifyResult<()> {
        (**self).notify(record)
    }
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn channel(&self) -> &str {
        (**self).channel()
    }

    fn notify(&self, record: &ResponseRecord) -> NotifyResult<()> {
        (**self).notify(record)
    }
}

/// Writes the owner summary to the service log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn channel(&self) -> &str {
        "log"
    }

    fn notify(&self, record: &ResponseRecord) -> NotifyResult<()> {
        let message = NotificationMessage::for_record(record);
        info!(
            "event=owner_notification module=notify channel=log response_id={} subject={:?}\n{}",
            record.id, message.subject, message.body
        );
        Ok(())
    }
}

/// Accepts every record and sends nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNotifier;

impl Notifier for DisabledNotifier {
    fn channel(&self) -> &str {
        "disabled"
    }

    fn notify(&self, _record: &ResponseRecord) -> NotifyResult<()> {
        Ok(())
    }
}

/// Builds the notifier selected by configuration.
pub fn build_notifier(config: &NotifierConfig) -> NotifyResult<Box<dyn Notifier>> {
    let notifier: Box<dyn Notifier> = match config {
        NotifierConfig::Log => Box::new(LogNotifier),
        NotifierConfig::Disabled => Box::new(DisabledNotifier),
        NotifierConfig::HttpEmail(email) => Box::new(HttpEmailNotifier::new(email.clone())?),
    };
    Ok(notifier)
}
