//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources an
//! [`Integration`](crate::Integration) owns for its whole life:
//! - Logger
//! - HTTP client (timeouts, proxy, TLS material)
//! - Request dispatcher (concurrency, spacing and queue limits)

mod client;
mod dispatcher;
mod logger;

use std::time::Duration;

use crate::config::{Config, MAX_QUEUED_LOOKUPS};

// Re-export public API
pub use client::init_client;
pub use dispatcher::{DispatchError, RequestDispatcher};
pub use logger::init_logger_with;

/// Initializes the request dispatcher from the startup configuration.
///
/// Limits are fixed for the dispatcher's lifetime; changing them requires a
/// new [`Integration`](crate::Integration).
pub fn init_dispatcher(config: &Config) -> RequestDispatcher {
    log::debug!(
        "Dispatcher limits: {} concurrent, {}ms between starts, {} queued",
        config.max_concurrent,
        config.min_time_ms,
        MAX_QUEUED_LOOKUPS
    );
    RequestDispatcher::new(
        config.max_concurrent,
        Duration::from_millis(config.min_time_ms),
        MAX_QUEUED_LOOKUPS,
    )
}
