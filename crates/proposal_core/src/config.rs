//! Process configuration read from environment variables.
//!
//! # Responsibility
//! - Resolve listener, storage, logging and notifier settings at startup.
//! - Reject malformed values up front instead of failing mid-request.
//!
//! # Invariants
//! - `from_lookup` is pure over its lookup function, so tests can drive it
//!   without touching the process environment.
//! - `http_email` notifier settings are complete or config loading fails.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_PORT: &str = "PORT";
pub const ENV_BIND_HOST: &str = "PROPOSAL_BIND_HOST";
pub const ENV_DB_PATH: &str = "PROPOSAL_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "PROPOSAL_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PROPOSAL_LOG_DIR";
pub const ENV_NOTIFIER: &str = "PROPOSAL_NOTIFIER";
pub const ENV_OWNER_EMAIL: &str = "PROPOSAL_OWNER_EMAIL";
pub const ENV_EMAIL_API_URL: &str = "PROPOSAL_EMAIL_API_URL";
pub const ENV_EMAIL_API_KEY: &str = "PROPOSAL_EMAIL_API_KEY";
pub const ENV_EMAIL_FROM: &str = "PROPOSAL_EMAIL_FROM";
pub const ENV_NOTIFY_TIMEOUT_MS: &str = "PROPOSAL_NOTIFY_TIMEOUT_MS";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BIND_HOST: &str = "0.0.0.0";
const DEFAULT_DB_PATH: &str = "proposal_responses.sqlite3";
const MEMORY_DB_PATH: &str = ":memory:";
const DEFAULT_NOTIFY_TIMEOUT_MS: u64 = 10_000;
const NOTIFY_TIMEOUT_RANGE_MS: std::ops::RangeInclusive<u64> = 100..=60_000;

/// Invalid or incomplete configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    MissingValue {
        key: &'static str,
        reason: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid value `{value}` for {key}: {reason}")
            }
            Self::MissingValue { key, reason } => write!(f, "{key} is required {reason}"),
        }
    }
}

impl Error for ConfigError {}

/// Where responses are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Sqlite(PathBuf),
    Memory,
}

/// Settings for the HTTP email API notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpEmailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
    pub owner_email: String,
    pub timeout: Duration,
}

/// Which notification channel reaches the proposal owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierConfig {
    /// Summary goes to the service log only.
    Log,
    /// No notification at all.
    Disabled,
    HttpEmail(HttpEmailConfig),
}

/// Full service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub bind_host: String,
    pub port: u16,
    pub storage: StorageConfig,
    pub log_level: &'static str,
    pub log_dir: Option<String>,
    pub notifier: NotifierConfig,
}

impl ServiceConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match get(ENV_PORT) {
            Some(value) => value.parse::<u16>().map_err(|err| ConfigError::InvalidValue {
                key: ENV_PORT,
                value: value.clone(),
                reason: err.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let storage = match get(ENV_DB_PATH) {
            Some(value) if value == MEMORY_DB_PATH => StorageConfig::Memory,
            Some(value) => StorageConfig::Sqlite(PathBuf::from(value)),
            None => StorageConfig::Sqlite(PathBuf::from(DEFAULT_DB_PATH)),
        };

        let log_level = match get(ENV_LOG_LEVEL) {
            Some(value) => normalize_level(&value).map_err(|reason| ConfigError::InvalidValue {
                key: ENV_LOG_LEVEL,
                value: value.clone(),
                reason,
            })?,
            None => default_log_level(),
        };

        let notifier = match get(ENV_NOTIFIER).map(|value| value.to_ascii_lowercase()) {
            None => NotifierConfig::Log,
            Some(kind) => match kind.as_str() {
                "log" => NotifierConfig::Log,
                "disabled" | "none" | "off" => NotifierConfig::Disabled,
                "http_email" => NotifierConfig::HttpEmail(http_email_config(&get)?),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_NOTIFIER,
                        value: kind.clone(),
                        reason: "expected log|http_email|disabled".to_string(),
                    })
                }
            },
        };

        Ok(Self {
            bind_host: get(ENV_BIND_HOST).unwrap_or_else(|| DEFAULT_BIND_HOST.to_string()),
            port,
            storage,
            log_level,
            log_dir: get(ENV_LOG_DIR),
            notifier,
        })
    }

    /// `host:port` string for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

fn http_email_config<G>(get: &G) -> Result<HttpEmailConfig, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    const REASON: &str = "when PROPOSAL_NOTIFIER=http_email";
    let require = |key: &'static str| {
        get(key).ok_or(ConfigError::MissingValue {
            key,
            reason: REASON,
        })
    };

    let api_url = require(ENV_EMAIL_API_URL)?;
    if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
        return Err(ConfigError::InvalidValue {
            key: ENV_EMAIL_API_URL,
            value: api_url,
            reason: "expected an http(s) URL".to_string(),
        });
    }

    let timeout_ms = match get(ENV_NOTIFY_TIMEOUT_MS) {
        Some(value) => value
            .parse::<u64>()
            .ok()
            .filter(|ms| NOTIFY_TIMEOUT_RANGE_MS.contains(ms))
            .ok_or_else(|| ConfigError::InvalidValue {
                key: ENV_NOTIFY_TIMEOUT_MS,
                value: value.clone(),
                reason: format!(
                    "expected milliseconds in {}..={}",
                    NOTIFY_TIMEOUT_RANGE_MS.start(),
                    NOTIFY_TIMEOUT_RANGE_MS.end()
                ),
            })?,
        None => DEFAULT_NOTIFY_TIMEOUT_MS,
    };

    Ok(HttpEmailConfig {
        api_url,
        api_key: require(ENV_EMAIL_API_KEY)?,
        from: require(ENV_EMAIL_FROM)?,
        owner_email: require(ENV_OWNER_EMAIL)?,
        timeout: Duration::from_millis(timeout_ms),
    })
}
