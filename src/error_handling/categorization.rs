//! Response classification.
//!
//! Every HTTP exchange with urlscan.io ends in exactly one [`Classification`].
//! The mapping is pure so it can be tested without a server; the only I/O
//! aware piece is [`TransportFailure::from_reqwest`], which inspects the
//! error chain of a failed request.

use std::error::Error as StdError;
use std::io::ErrorKind;

use serde_json::Value;

use super::types::{LimitKind, LookupError, StageError};
use crate::config::{
    HTTP_STATUS_BAD_GATEWAY, HTTP_STATUS_GATEWAY_TIMEOUT, HTTP_STATUS_INTERNAL_SERVER_ERROR,
    HTTP_STATUS_NOT_FOUND, HTTP_STATUS_OK, HTTP_STATUS_TOO_MANY_REQUESTS,
    HTTP_STATUS_UNAUTHORIZED,
};

/// A request that failed before a response arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    /// The peer reset or aborted the connection (`ECONNRESET`)
    pub connection_reset: bool,
    /// The client-side timeout elapsed
    pub timed_out: bool,
    pub message: String,
}

impl TransportFailure {
    /// Describes a failed `reqwest` request.
    ///
    /// Walks the source chain looking for the underlying I/O error, since
    /// resets surface several layers below the `reqwest::Error`.
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        let mut connection_reset = false;
        let mut source: Option<&(dyn StdError + 'static)> = error.source();
        while let Some(cause) = source {
            if let Some(io) = cause.downcast_ref::<std::io::Error>() {
                if matches!(
                    io.kind(),
                    ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
                ) {
                    connection_reset = true;
                    break;
                }
            }
            source = cause.source();
        }

        TransportFailure {
            connection_reset,
            timed_out: error.is_timeout(),
            message: error.to_string(),
        }
    }
}

/// Outcome of one HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpOutcome {
    Transport(TransportFailure),
    Response {
        status: u16,
        /// Parsed JSON body, when the body was JSON
        body: Option<Value>,
    },
}

/// Closed taxonomy of exchange outcomes.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// 200, with the body if it parsed
    Success(Option<Value>),
    /// 404
    Miss,
    /// 401; terminal, not retryable
    Unauthorized,
    /// 429; the caller should fetch the quota
    QuotaExceeded,
    /// 500/502/504 or a client-side timeout; safe to retry
    GatewayUnavailable,
    /// Transport-level reset; safe to retry
    ConnectionReset,
    /// Anything else
    Error(LookupError),
}

impl Classification {
    /// Splits the classification into data or a stage failure.
    ///
    /// `Ok(None)` is a miss.
    pub fn into_stage_result(self) -> Result<Option<Value>, StageError> {
        match self {
            Classification::Success(body) => Ok(Some(body.unwrap_or(Value::Null))),
            Classification::Miss => Ok(None),
            Classification::Unauthorized => Err(LookupError::Unauthorized.into()),
            Classification::QuotaExceeded => Err(StageError::Limit(LimitKind::QuotaReached)),
            Classification::GatewayUnavailable => {
                Err(StageError::Limit(LimitKind::GatewayTimeout))
            }
            Classification::ConnectionReset => Err(StageError::Limit(LimitKind::ConnectionReset)),
            Classification::Error(err) => Err(err.into()),
        }
    }

    /// The transient limit this classification represents, if any.
    pub fn limit_kind(&self) -> Option<LimitKind> {
        match self {
            Classification::QuotaExceeded => Some(LimitKind::QuotaReached),
            Classification::GatewayUnavailable => Some(LimitKind::GatewayTimeout),
            Classification::ConnectionReset => Some(LimitKind::ConnectionReset),
            _ => None,
        }
    }
}

/// Classifies an HTTP exchange.
///
/// # Arguments
///
/// * `outcome` - Transport failure or status code with optional JSON body
///
/// # Returns
///
/// The single [`Classification`] for the outcome. Transport failures that are
/// neither resets nor timeouts become `Classification::Error` with
/// [`LookupError::Http`].
pub fn classify(outcome: &HttpOutcome) -> Classification {
    match outcome {
        HttpOutcome::Transport(failure) if failure.connection_reset => {
            Classification::ConnectionReset
        }
        HttpOutcome::Transport(failure) if failure.timed_out => Classification::GatewayUnavailable,
        HttpOutcome::Transport(failure) => {
            Classification::Error(LookupError::Http(failure.message.clone()))
        }
        HttpOutcome::Response { status, body } => match *status {
            HTTP_STATUS_OK => Classification::Success(body.clone()),
            HTTP_STATUS_NOT_FOUND => Classification::Miss,
            HTTP_STATUS_UNAUTHORIZED => Classification::Unauthorized,
            HTTP_STATUS_TOO_MANY_REQUESTS => Classification::QuotaExceeded,
            HTTP_STATUS_INTERNAL_SERVER_ERROR
            | HTTP_STATUS_BAD_GATEWAY
            | HTTP_STATUS_GATEWAY_TIMEOUT => Classification::GatewayUnavailable,
            other => Classification::Error(status_error(other, body.as_ref())),
        },
    }
}

/// Builds the error for an unexpected status from the server's JSON body.
fn status_error(status: u16, body: Option<&Value>) -> LookupError {
    let field = |name: &str| {
        body.and_then(|b| b.get(name))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    LookupError::Status {
        status,
        message: field("message").unwrap_or_else(|| "Bad Request".to_string()),
        description: field("description"),
    }
}
