//! Error type definitions.
//!
//! This module defines the errors returned by startup, lookups and option
//! validation, plus the transient limit kinds that degrade a result instead
//! of failing it.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use serde::Serialize;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::models::SearchLimitState;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// A configured certificate, key or CA file could not be read.
    #[error("Failed to read {path}: {source}")]
    TlsFileError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configured base URL is not a valid absolute URL.
    #[error("Invalid base URL {0}: {1}")]
    BaseUrlError(String, url::ParseError),
}

/// Hard lookup failures.
///
/// These are never retried automatically; the host renders them as a failed
/// lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "detail")]
pub enum LookupError {
    /// urlscan.io rejected the API key.
    #[error("Unauthorized")]
    Unauthorized,

    /// Unexpected HTTP status, with the server's message when it sent one.
    #[error("{message} (HTTP {status})")]
    Status {
        status: u16,
        message: String,
        description: Option<String>,
    },

    /// The request never produced a response.
    #[error("HTTP Request Error: {0}")]
    Http(String),

    /// The screenshot download returned an unexpected status.
    #[error("Unexpected status code or Image Not Found when downloading screenshot from urlscan (HTTP {status})")]
    Screenshot { status: u16 },

    /// A response body could not be decoded.
    #[error("Failed to decode urlscan response: {0}")]
    Decode(String),

    /// The quota endpoint failed.
    #[error("Error fetching user quota: {0}")]
    Quota(Box<LookupError>),
}

impl LookupError {
    /// Best human-readable message for display next to the submission form.
    ///
    /// Prefers the server message joined with its description, then the
    /// server message alone, then the error's own description.
    pub fn display_message(&self) -> String {
        match self {
            LookupError::Status {
                message,
                description: Some(description),
                ..
            } if !description.is_empty() => format!("{message}\n\n{description}"),
            LookupError::Status { message, .. } => message.clone(),
            LookupError::Quota(inner) => inner.display_message(),
            other => other.to_string(),
        }
    }
}

/// Transient conditions that turn a lookup into a volatile, retryable result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum LimitKind {
    /// The dispatcher queue was full and the lookup was dropped
    QueueOverflow,
    /// The connection was reset mid-request
    ConnectionReset,
    /// urlscan.io (or its gateway) failed or timed out
    GatewayTimeout,
    /// The API key's quota is exhausted
    QuotaReached,
}

impl LimitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitKind::QueueOverflow => "Lookup queue overflow",
            LimitKind::ConnectionReset => "Connection reset",
            LimitKind::GatewayTimeout => "Gateway timeout",
            LimitKind::QuotaReached => "Quota reached",
        }
    }

    /// Flags describing this limit, without a quota snapshot.
    pub fn to_state(self) -> SearchLimitState {
        SearchLimitState {
            max_request_queue_limit_hit: self == LimitKind::QueueOverflow,
            is_connection_reset: self == LimitKind::ConnectionReset,
            is_gateway_timeout: self == LimitKind::GatewayTimeout,
            is_quota_reached: self == LimitKind::QuotaReached,
            is_search_limit_error: true,
            quota: None,
        }
    }
}

impl std::fmt::Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one pipeline stage: either transient or hard.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    #[error("{0}")]
    Limit(LimitKind),
    #[error(transparent)]
    Hard(#[from] LookupError),
}

/// A user option that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Option key, as the host names it
    pub key: String,
    pub message: String,
}
