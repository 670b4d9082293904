//! Response submission use-case service.
//!
//! # Responsibility
//! - Run one submission through validation, persistence and notification.
//! - Expose read-only listing over the store.
//!
//! # Invariants
//! - The store is untouched when validation fails.
//! - Once `append` succeeds the submission succeeds; notifier failures are
//!   logged and reported in the receipt, never returned as errors.
//! - Log lines carry ids and states only, not respondent free text.

use crate::model::response::{ResponseId, ResponseRecord};
use crate::model::validation::{validate, ValidationError};
use crate::notify::Notifier;
use crate::repo::response_repo::{ResponseStore, StoreError, StoreResult};
use log::{error, info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Submission failure surfaced to the caller.
#[derive(Debug)]
pub enum SubmitError {
    /// Client error; nothing was persisted.
    Validation(ValidationError),
    /// Server error; the response must not be treated as saved.
    Storage(StoreError),
}

impl Display for SubmitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid submission: {err}"),
            Self::Storage(err) => write!(f, "could not save response: {err}"),
        }
    }
}

impl Error for SubmitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<ValidationError> for SubmitError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for SubmitError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value)
    }
}

/// What happened to the owner notification of a persisted response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Sent,
    Failed(String),
}

/// Successful submission: the stored record plus the notification result.
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub record: ResponseRecord,
    pub notification: NotificationOutcome,
}

impl SubmissionReceipt {
    pub fn id(&self) -> ResponseId {
        self.record.id
    }
}

/// Orchestrates validator, store and notifier.
pub struct ResponseService<S: ResponseStore, N: Notifier> {
    store: S,
    notifier: N,
}

impl<S: ResponseStore, N: Notifier> ResponseService<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    /// Validates, persists and notifies one raw submission.
    ///
    /// `source_address` is recorded for audit as given; callers pass
    /// `Some("unknown")` when the origin cannot be determined.
    ///
    /// # Errors
    /// - `SubmitError::Validation` when required fields are missing.
    /// - `SubmitError::Storage` when the store rejects the append.
    pub fn submit(
        &self,
        payload: &Value,
        source_address: Option<String>,
    ) -> Result<SubmissionReceipt, SubmitError> {
        let started_at = Instant::now();

        let draft = match validate(payload) {
            Ok(draft) => draft.with_source_address(source_address),
            Err(err) => {
                warn!("{}", validation_failure_line(&err));
                return Err(err.into());
            }
        };

        let record = match self.store.append(draft) {
            Ok(record) => record,
            Err(err) => {
                error!(
                    "event=response_submit module=service status=error state=validated error_code=store_append_failed duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };

        let notification = match self.notifier.notify(&record) {
            Ok(()) => NotificationOutcome::Sent,
            Err(err) => {
                warn!(
                    "event=owner_notification module=service status=error channel={} response_id={} error={}",
                    self.notifier.channel(),
                    record.id,
                    err
                );
                NotificationOutcome::Failed(err.to_string())
            }
        };

        info!(
            "event=response_submit module=service status=ok state=completed response_id={} proposal_id={:?} decision={} notified={} duration_ms={}",
            record.id,
            record.proposal_id,
            record.decision,
            notification == NotificationOutcome::Sent,
            started_at.elapsed().as_millis()
        );

        Ok(SubmissionReceipt {
            record,
            notification,
        })
    }

    /// Every stored response, newest first.
    pub fn get_all(&self) -> StoreResult<Vec<ResponseRecord>> {
        self.store.list_all()
    }

    /// Responses for one proposal, in `get_all` order.
    pub fn get_by_proposal(&self, proposal_id: &str) -> StoreResult<Vec<ResponseRecord>> {
        self.store.list_by_proposal(proposal_id)
    }

    /// Number of stored responses.
    pub fn count(&self) -> StoreResult<u64> {
        self.store.count()
    }
}

fn validation_failure_line(err: &ValidationError) -> String {
    format!(
        "event=response_submit module=service status=error state=received error_code=validation_failed reason={} field={}",
        err.code(),
        err.field()
    )
}

#[cfg(test)]
mod tests {
    use super::validation_failure_line;
    use crate::model::validation::{validate, ValidationError};
    use serde_json::json;

    #[test]
    fn validation_failure_line_omits_submitted_decision_text() {
        let payload = json!({
            "proposalId": "P1",
            "decision": "maybe\nevent=response_submit status=ok forged=1",
            "name": "Ana",
            "email": "ana@x.com"
        });
        let err = validate(&payload).unwrap_err();

        let line = validation_failure_line(&err);
        assert!(!line.contains('\n'));
        assert!(!line.contains("forged"));
        assert!(!line.contains("maybe"));
        assert!(line.ends_with("reason=unsupported_decision field=decision"));
    }

    #[test]
    fn validation_failure_line_names_missing_field() {
        let line = validation_failure_line(&ValidationError::MissingField("name"));
        assert!(line.ends_with("reason=missing_field field=name"));
    }
}
