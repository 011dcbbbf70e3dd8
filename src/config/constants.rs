//! Configuration constants.
//!
//! This module defines the defaults and fixed limits used throughout the
//! integration: API locations, request limits, entity validation bounds and
//! dispatcher queue sizing.

// urlscan.io locations
/// Default urlscan.io origin. API paths are joined onto this.
pub const DEFAULT_BASE_URL: &str = "https://urlscan.io";
/// Search endpoint, relative to the base URL
pub const SEARCH_PATH: &str = "api/v1/search";
/// Scan submission endpoint, relative to the base URL
pub const SCAN_PATH: &str = "api/v1/scan/";
/// Quota endpoint, relative to the base URL (not under `/api`)
pub const QUOTA_PATH: &str = "user/quotas";

/// Default User-Agent for outbound requests.
pub const DEFAULT_USER_AGENT: &str = concat!("urlscan_lookup/", env!("CARGO_PKG_VERSION"));

// Network operation timeouts
/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 10;

// Dispatcher
/// Default maximum number of lookups in flight at once
pub const DEFAULT_MAX_CONCURRENT: usize = 20;
/// Default minimum spacing between lookup starts, in milliseconds
pub const DEFAULT_MIN_TIME_MS: u64 = 100;
/// Maximum number of lookups waiting for admission.
/// Submissions beyond this are dropped rather than queued.
pub const MAX_QUEUED_LOOKUPS: usize = 100;

// Search
/// Search page size; only the first hit is enriched
pub const SEARCH_RESULT_SIZE: &str = "1";

// Entity validation
/// Maximum length of a single dot-separated domain label
pub const MAX_DOMAIN_LABEL_LENGTH: usize = 63;
/// Maximum total domain length
pub const MAX_DOMAIN_LENGTH: usize = 253;
/// IPv4 addresses that are never looked up
pub const IGNORED_IPS: &[&str] = &["127.0.0.1", "255.255.255.255", "0.0.0.0"];

// Submission
/// Tag always attached to submitted scans
pub const DEFAULT_SUBMISSION_TAG: &str = "polarity";

// Screenshots
/// Content type used when the screenshot response omits one
pub const DEFAULT_SCREENSHOT_CONTENT_TYPE: &str = "image/png";

// Summaries shown by the host
pub const SUMMARY_QUOTA_EXCEEDED: &str = "Search Quota Exceeded";
pub const SUMMARY_LIMIT_REACHED: &str = "Search Limit Reached";
pub const SUMMARY_NO_RESULTS_ON_RETRY: &str = "No Results Found on Retry";

/// Message returned for blocklist patterns that do not compile
pub const INVALID_REGEX_MESSAGE: &str =
    "You must provide a valid regular expression (do not surround your regex in forward slashes)";

// HTTP status codes (for clarity and consistency)
pub const HTTP_STATUS_OK: u16 = 200;
pub const HTTP_STATUS_UNAUTHORIZED: u16 = 401;
pub const HTTP_STATUS_NOT_FOUND: u16 = 404;
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
pub const HTTP_STATUS_INTERNAL_SERVER_ERROR: u16 = 500;
pub const HTTP_STATUS_BAD_GATEWAY: u16 = 502;
pub const HTTP_STATUS_GATEWAY_TIMEOUT: u16 = 504;
