//! Memoized blocklist regexes.

use regex::{Regex, RegexBuilder};

use crate::config::Options;

/// A case-insensitive regex compiled from a user option string.
///
/// Recompiles only when the source string changes; an empty source disables
/// the pattern.
#[derive(Debug, Default)]
pub struct CachedPattern {
    source: String,
    regex: Option<Regex>,
    compilations: usize,
}

impl CachedPattern {
    /// Brings the cached regex in line with `pattern`.
    ///
    /// Returns `Ok(true)` when the cached state changed.
    ///
    /// # Errors
    ///
    /// Returns the compile error for an invalid pattern. The previous regex
    /// is discarded so an invalid pattern never leaves a stale filter active.
    pub fn update(&mut self, pattern: &str) -> Result<bool, regex::Error> {
        if pattern == self.source {
            return Ok(false);
        }

        self.source = pattern.to_string();
        if pattern.is_empty() {
            self.regex = None;
            return Ok(true);
        }

        self.compilations += 1;
        match compile(pattern) {
            Ok(regex) => {
                self.regex = Some(regex);
                Ok(true)
            }
            Err(e) => {
                self.regex = None;
                Err(e)
            }
        }
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.as_ref().is_some_and(|r| r.is_match(value))
    }

    pub fn is_active(&self) -> bool {
        self.regex.is_some()
    }

    /// Number of times a non-empty pattern has been compiled.
    pub fn compilations(&self) -> usize {
        self.compilations
    }
}

/// Compiles a blocklist pattern the way lookups apply it.
pub fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Domain and IP blocklist regexes, owned by the integration.
#[derive(Debug, Default)]
pub struct BlocklistCache {
    pub domain: CachedPattern,
    pub ip: CachedPattern,
}

impl BlocklistCache {
    /// Syncs both patterns with the batch options.
    ///
    /// Invalid patterns are logged and leave that filter disabled; option
    /// validation is where they are reported to the user.
    pub fn sync(&mut self, options: &Options) {
        match self.domain.update(&options.domain_blocklist_regex) {
            Ok(true) if self.domain.is_active() => log::debug!(
                "Modifying domain blocklist regex: {}",
                options.domain_blocklist_regex
            ),
            Ok(true) => log::debug!("Removing domain blocklist regex filtering"),
            Ok(false) => {}
            Err(e) => log::error!("Ignoring invalid domain blocklist regex: {}", e),
        }

        match self.ip.update(&options.ip_blocklist_regex) {
            Ok(true) if self.ip.is_active() => log::debug!(
                "Modifying IP blocklist regex: {}",
                options.ip_blocklist_regex
            ),
            Ok(true) => log::debug!("Removing IP blocklist regex filtering"),
            Ok(false) => {}
            Err(e) => log::error!("Ignoring invalid IP blocklist regex: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_pattern_compiles_once() {
        let mut pattern = CachedPattern::default();
        assert_eq!(pattern.update(r"\.corp$"), Ok(true));
        assert_eq!(pattern.update(r"\.corp$"), Ok(false));
        assert_eq!(pattern.compilations(), 1);
        assert!(pattern.is_match("intranet.CORP"));
    }

    #[test]
    fn test_changed_pattern_recompiles() {
        let mut pattern = CachedPattern::default();
        pattern.update("^a").expect("valid");
        pattern.update("^b").expect("valid");
        assert_eq!(pattern.compilations(), 2);
        assert!(pattern.is_match("bravo"));
        assert!(!pattern.is_match("alpha"));
    }

    #[test]
    fn test_empty_pattern_disables_filter() {
        let mut pattern = CachedPattern::default();
        pattern.update("example").expect("valid");
        assert!(pattern.is_active());

        assert_eq!(pattern.update(""), Ok(true));
        assert!(!pattern.is_active());
        assert!(!pattern.is_match("example.com"));
    }

    #[test]
    fn test_invalid_pattern_clears_previous_regex() {
        let mut pattern = CachedPattern::default();
        pattern.update("example").expect("valid");
        assert!(pattern.update("(unclosed").is_err());
        assert!(!pattern.is_active());
        // Same invalid source again is a no-op
        assert_eq!(pattern.update("(unclosed"), Ok(false));
    }

    #[test]
    fn test_sync_uses_both_options() {
        let mut cache = BlocklistCache::default();
        let options = Options {
            domain_blocklist_regex: r"\.internal$".to_string(),
            ip_blocklist_regex: r"^8\.8\.".to_string(),
            ..Default::default()
        };
        cache.sync(&options);
        cache.sync(&options);

        assert!(cache.domain.is_match("db.internal"));
        assert!(cache.ip.is_match("8.8.8.8"));
        assert_eq!(cache.domain.compilations(), 1);
        assert_eq!(cache.ip.compilations(), 1);
    }
}
