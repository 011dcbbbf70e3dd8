//! Command-line interface.
//!
//! The binary is a standalone host for the library: global flags map onto
//! [`Config`] and [`Options`], and each subcommand maps onto one entry point.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::constants::{
    DEFAULT_BASE_URL, DEFAULT_MAX_CONCURRENT, DEFAULT_MIN_TIME_MS, DEFAULT_SUBMISSION_TAG,
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
use crate::config::types::{Config, LogFormat, LogLevel, Options};

/// Look up indicators on urlscan.io.
#[derive(Debug, Parser)]
#[command(name = "urlscan_lookup", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// urlscan.io API key
    #[arg(long, env = "URLSCAN_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// urlscan.io origin, including the scheme
    #[arg(long, env = "URLSCAN_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Maximum lookups in flight at once
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT)]
    pub max_concurrent: usize,

    /// Minimum milliseconds between lookup starts
    #[arg(long, default_value_t = DEFAULT_MIN_TIME_MS)]
    pub min_time_ms: u64,

    /// HTTP(S) proxy URL
    #[arg(long, env = "URLSCAN_PROXY")]
    pub proxy: Option<String>,

    /// Extra PEM certificate authority to trust
    #[arg(long)]
    pub ca_file: Option<PathBuf>,

    /// PEM client certificate
    #[arg(long, requires = "key_file")]
    pub cert_file: Option<PathBuf>,

    /// PEM private key for --cert-file
    #[arg(long, requires = "cert_file")]
    pub key_file: Option<PathBuf>,

    /// Accept invalid server certificates
    #[arg(long)]
    pub insecure: bool,

    /// Tag attached to submitted scans
    #[arg(long, default_value = DEFAULT_SUBMISSION_TAG)]
    pub submission_tag: String,


    /// Comma separated values that are never looked up
    #[arg(long, default_value = "")]
    pub blocklist: String,

    /// Domains matching this regex are never looked up
    #[arg(long, default_value = "")]
    pub domain_blocklist_regex: String,

    /// Public IPs matching this regex are never looked up
    #[arg(long, default_value = "")]
    pub ip_blocklist_regex: String,

    /// Only report results marked malicious
    #[arg(long)]
    pub malicious_only: bool,

    /// Inline screenshots as base64 data URIs
    #[arg(long)]
    pub download_screenshot: bool,

    /// Flag unknown domains and URLs as submittable
    #[arg(long)]
    pub submit_url: bool,

    /// Also match scans where the indicator was the submitted task
    #[arg(long)]
    pub include_tasked_indicators: bool,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up one or more indicators
    Lookup(LookupArgs),
    /// Re-run the lookup for a single indicator
    Retry(LookupArgs),
    /// Show the quota for the configured API key
    Quota,
    /// Submit a URL or domain for scanning
    Submit(SubmitArgs),
    /// Check the blocklist patterns
    Validate,
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Indicator values; types are inferred
    #[arg(required = true)]
    pub values: Vec<String>,

    /// Treat the lookup as automatic rather than on-demand
    #[arg(long)]
    pub passive: bool,
}

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// URL or domain to scan
    pub value: String,

    /// Comma separated tags
    #[arg(long, default_value = "")]
    pub tags: String,

    /// Make the scan publicly visible
    #[arg(long)]
    pub public: bool,
}

impl GlobalArgs {
    /// Builds the startup configuration from the parsed flags.
    pub fn to_config(&self) -> Config {
        Config {
            base_url: self.base_url.clone(),
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
            timeout_seconds: self.timeout_seconds,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_concurrent: self.max_concurrent,
            min_time_ms: self.min_time_ms,
            proxy: self.proxy.clone(),
            ca_file: self.ca_file.clone(),
            cert_file: self.cert_file.clone(),
            key_file: self.key_file.clone(),
            reject_unauthorized: !self.insecure,
            submission_tag: self.submission_tag.clone(),
        }
    }

    /// Builds the per-batch options from the parsed flags.
    pub fn to_options(&self) -> Options {
        Options {
            api_key: self.api_key.clone(),
            blocklist: self.blocklist.clone(),
            domain_blocklist_regex: self.domain_blocklist_regex.clone(),
            ip_blocklist_regex: self.ip_blocklist_regex.clone(),
            malicious_only: self.malicious_only,
            download_screenshot: self.download_screenshot,
            submit_url: self.submit_url,
            include_tasked_indicators: self.include_tasked_indicators,
        }
    }
}
