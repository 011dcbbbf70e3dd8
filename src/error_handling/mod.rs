//! Error handling and lookup statistics.
//!
//! This module provides:
//! - Error type definitions (startup, hard lookup failures, validation)
//! - Transient limit kinds that degrade a result instead of failing it
//! - Pure classification of HTTP outcomes
//! - Per-batch counters of degraded lookups
//!
//! Outcomes fall into three groups:
//! - **Hard errors**: unauthorized, unexpected status, undecodable body
//! - **Limits**: queue overflow, connection reset, gateway timeout, quota
//! - **Data**: success or miss

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{classify, Classification, HttpOutcome, TransportFailure};
pub use stats::LookupStats;
pub use types::{
    InitializationError, LimitKind, LookupError, StageError, ValidationError,
};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_lookup_stats_initialization() {
        let stats = LookupStats::new();
        for kind in LimitKind::iter() {
            assert_eq!(stats.count(kind), 0);
        }
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn test_lookup_stats_increment() {
        let stats = LookupStats::new();
        stats.increment(LimitKind::ConnectionReset);
        stats.increment(LimitKind::ConnectionReset);
        stats.increment(LimitKind::QuotaReached);

        assert_eq!(stats.count(LimitKind::ConnectionReset), 2);
        assert_eq!(stats.count(LimitKind::QuotaReached), 1);
        assert_eq!(stats.count(LimitKind::GatewayTimeout), 0);
        assert_eq!(stats.total(), 3);
    }

    #[test]
    fn test_log_summary_does_not_panic() {
        let stats = LookupStats::new();
        stats.log_summary(0);
        stats.increment(LimitKind::QueueOverflow);
        stats.log_summary(150);
    }
}
