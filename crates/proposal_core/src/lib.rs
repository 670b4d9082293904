//! Core domain logic for proposal responses.
//! This crate is the single source of truth for submission invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;

pub use config::{ConfigError, HttpEmailConfig, NotifierConfig, ServiceConfig, StorageConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::response::{Decision, ResponseDraft, ResponseId, ResponseRecord};
pub use model::validation::{validate, ValidationError, REQUIRED_FIELDS};
pub use notify::{
    build_notifier, DisabledNotifier, HttpEmailNotifier, LogNotifier, NotificationMessage,
    Notifier, NotifyError, NotifyResult,
};
pub use repo::memory_repo::MemoryResponseStore;
pub use repo::open_store;
pub use repo::response_repo::{ResponseStore, SqliteResponseStore, StoreError, StoreResult};
pub use service::response_service::{
    NotificationOutcome, ResponseService, SubmissionReceipt, SubmitError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
