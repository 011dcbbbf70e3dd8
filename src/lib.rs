//! urlscan_lookup library: threat-intelligence enrichment from urlscan.io
//!
//! This library looks up indicators (IPs, domains, URLs and file hashes) on
//! urlscan.io and returns the latest scan, its verdicts, referrer links and
//! optionally an inlined screenshot. Lookups are filtered, rate limited and
//! degraded gracefully: quota, gateway and connection failures become
//! volatile results the host can offer to retry.
//!
//! # Example
//!
//! ```no_run
//! use urlscan_lookup::{Config, Entity, Integration, Options};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let integration = Integration::startup(&Config::default())?;
//! let options = Options {
//!     api_key: "my-key".to_string(),
//!     ..Default::default()
//! };
//!
//! let entities: Vec<Entity> = ["example.com", "133.167.35.116"]
//!     .iter()
//!     .filter_map(|v| Entity::infer(v))
//!     .collect();
//! let batch = integration.lookup(&entities, &options).await;
//! println!("{} results, {} errors", batch.results.len(), batch.errors.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod config;
pub mod error_handling;
pub mod fetch;
pub mod filter;
pub mod initialization;
mod integration;
pub mod lookup;
pub mod messages;
pub mod models;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, Options};
pub use error_handling::{InitializationError, LookupError, ValidationError};
pub use integration::{validate_options, Integration};
pub use lookup::{LookupBatch, LookupFailure};
pub use messages::{Message, MessageResponse};
pub use models::{Entity, EntityType, LookupResult};
