//! Configuration types.
//!
//! `Config` is the startup snapshot: it shapes the HTTP client and the request
//! dispatcher and never changes for the life of an [`Integration`](crate::Integration).
//! `Options` is the per-batch snapshot the host passes with every lookup.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::Deserialize;

use crate::config::constants::{
    DEFAULT_BASE_URL, DEFAULT_MAX_CONCURRENT, DEFAULT_MIN_TIME_MS, DEFAULT_SUBMISSION_TAG,
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Startup configuration (no CLI dependencies).
///
/// The dispatcher limits live here rather than in [`Options`]: they are read
/// once when the integration starts and a restart is required to change them.
///
/// # Examples
///
/// ```no_run
/// use urlscan_lookup::Config;
///
/// let config = Config {
///     max_concurrent: 5,
///     min_time_ms: 250,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// urlscan.io origin, including the scheme
    pub base_url: String,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Maximum lookups in flight at once
    pub max_concurrent: usize,

    /// Minimum milliseconds between successive lookup starts
    pub min_time_ms: u64,

    /// HTTP(S) proxy URL; basic auth may be embedded in the URL
    pub proxy: Option<String>,

    /// Additional PEM certificate authority to trust
    pub ca_file: Option<PathBuf>,

    /// PEM client certificate, used together with `key_file`
    pub cert_file: Option<PathBuf>,

    /// PEM private key for `cert_file`
    pub key_file: Option<PathBuf>,

    /// Reject invalid server certificates
    pub reject_unauthorized: bool,

    /// Tag attached to every submitted scan
    pub submission_tag: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            min_time_ms: DEFAULT_MIN_TIME_MS,
            proxy: None,
            ca_file: None,
            cert_file: None,
            key_file: None,
            reject_unauthorized: true,
            submission_tag: DEFAULT_SUBMISSION_TAG.to_string(),
        }
    }
}

/// Per-batch user options.
///
/// Deserializes from the camelCase JSON a host sends; every field has a
/// default so partial payloads are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// urlscan.io API key; searches run anonymously without one
    pub api_key: String,


    /// Comma or whitespace separated values that are never looked up
    pub blocklist: String,

    /// Case-insensitive regex; matching domains are never looked up
    pub domain_blocklist_regex: String,

    /// Case-insensitive regex; matching public IPs are never looked up
    pub ip_blocklist_regex: String,

    /// Only return results urlscan.io marks as malicious
    pub malicious_only: bool,

    /// Download the screenshot and inline it as a data URI
    pub download_screenshot: bool,

    /// Allow the user to submit unknown domains and URLs for scanning
    pub submit_url: bool,

    /// Also match scans where the indicator was the submitted task
    pub include_tasked_indicators: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            blocklist: String::new(),
            domain_blocklist_regex: String::new(),
            ip_blocklist_regex: String::new(),
            malicious_only: false,
            download_screenshot: false,
            submit_url: false,
            include_tasked_indicators: false,
        }
    }
}

impl Options {
    /// Returns the API key when one is configured.
    pub fn api_key(&self) -> Option<&str> {
        let key = self.api_key.trim();
        if key.is_empty() {
            None
        } else {
            Some(key)
        }
    }

    /// Returns the lowercased plain-text blocklist entries.
    pub fn blocklist_entries(&self) -> impl Iterator<Item = String> + '_ {
        self.blocklist
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_lowercase)
    }
}
