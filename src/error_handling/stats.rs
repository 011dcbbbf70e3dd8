//! Per-batch limit statistics.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::LimitKind;

/// Thread-safe counters of degraded lookups by [`LimitKind`].
///
/// All kinds are initialized to zero on creation, so incrementing never
/// allocates and can happen concurrently from every lookup in a batch.
pub struct LookupStats {
    limits: HashMap<LimitKind, AtomicUsize>,
}

impl LookupStats {
    pub fn new() -> Self {
        let mut limits = HashMap::new();
        for kind in LimitKind::iter() {
            limits.insert(kind, AtomicUsize::new(0));
        }
        LookupStats { limits }
    }

    pub fn increment(&self, kind: LimitKind) {
        if let Some(counter) = self.limits.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment limit counter for {:?} which is not in the map",
                kind
            );
        }
    }

    pub fn count(&self, kind: LimitKind) -> usize {
        self.limits
            .get(&kind)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.limits.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    /// Logs a warning when resets or queue overflows occurred in the batch.
    pub fn log_summary(&self, entities_looked_up: usize) {
        let resets = self.count(LimitKind::ConnectionReset);
        let throttled = self.count(LimitKind::QueueOverflow);
        if resets > 0 || throttled > 0 {
            log::warn!(
                "Lookup limit error: {} entities looked up, {} connection resets, {} lookups throttled, {} gateway timeouts, {} quota errors",
                entities_looked_up,
                resets,
                throttled,
                self.count(LimitKind::GatewayTimeout),
                self.count(LimitKind::QuotaReached)
            );
        }
    }
}

impl Default for LookupStats {
    fn default() -> Self {
        Self::new()
    }
}
