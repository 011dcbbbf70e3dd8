//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (endpoints, limits, defaults)
//! - Startup `Config` and per-batch `Options`
//! - CLI option types and parsing

mod cli;
mod constants;
mod types;

pub use cli::{Cli, Command, GlobalArgs, LookupArgs, SubmitArgs};
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel, Options};
