//! Entity filtering.
//!
//! Decides, before any network call, which entities are never sent to
//! urlscan.io: malformed domains, automatic URL lookups, reserved and
//! private addresses, and anything the user blocklisted.

mod blocklist;

pub use blocklist::{compile as compile_blocklist_regex, BlocklistCache, CachedPattern};

use crate::config::{Options, IGNORED_IPS, MAX_DOMAIN_LABEL_LENGTH, MAX_DOMAIN_LENGTH};
use crate::models::Entity;

/// True when the entity must not be looked up.
pub fn is_rejected(entity: &Entity, options: &Options, blocklists: &BlocklistCache) -> bool {
    is_invalid_entity(entity) || is_blocklisted(entity, options, blocklists)
}

/// Structural checks that do not depend on user options.
pub fn is_invalid_entity(entity: &Entity) -> bool {
    if entity.is_domain() {
        if entity.value.chars().count() > MAX_DOMAIN_LENGTH {
            return true;
        }
        if entity
            .value
            .split('.')
            .any(|label| label.chars().count() > MAX_DOMAIN_LABEL_LENGTH)
        {
            return true;
        }
    }

    // URLs are only looked up when the user asked for them
    if entity.is_url() && !entity.is_on_demand() {
        return true;
    }

    if entity.is_ipv4() && IGNORED_IPS.contains(&entity.value.as_str()) {
        return true;
    }

    entity.is_private_ip()
}

/// Plain-text and regex blocklist checks.
pub fn is_blocklisted(entity: &Entity, options: &Options, blocklists: &BlocklistCache) -> bool {
    let value = entity.value.to_lowercase();
    if options.blocklist_entries().any(|entry| entry == value) {
        log::debug!("Blocked blocklisted entity: {}", entity.value);
        return true;
    }

    if entity.is_ip() && !entity.is_private_ip() && blocklists.ip.is_match(&entity.value) {
        log::debug!("Blocked blocklisted IP lookup: {}", entity.value);
        return true;
    }

    if entity.is_domain() && blocklists.domain.is_match(&entity.value) {
        log::debug!("Blocked blocklisted domain lookup: {}", entity.value);
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityType;

    fn no_blocklists() -> BlocklistCache {
        BlocklistCache::default()
    }

    fn reject(entity: &Entity) -> bool {
        is_rejected(entity, &Options::default(), &no_blocklists())
    }

    #[test]
    fn test_long_domain_label_rejected() {
        let label = "a".repeat(64);
        let entity = Entity::new(EntityType::Domain, format!("{label}.com"));
        assert!(reject(&entity));

        let ok = Entity::new(EntityType::Domain, format!("{}.com", "a".repeat(63)));
        assert!(!reject(&ok));
    }

    #[test]
    fn test_long_domain_rejected() {
        // 4 labels of 63 chars plus separators: 255 characters
        let long = vec!["b".repeat(63); 4].join(".");
        assert!(long.len() > 253);
        assert!(reject(&Entity::new(EntityType::Domain, long)));
    }

    #[test]
    fn test_passive_url_rejected() {
        let url = Entity::new(EntityType::Url, "https://example.com/login");
        assert!(reject(&url));
        assert!(!reject(&url.on_demand()));
    }

    #[test]
    fn test_reserved_ipv4_rejected() {
        for ip in ["127.0.0.1", "255.255.255.255", "0.0.0.0"] {
            assert!(reject(&Entity::new(EntityType::Ipv4, ip)), "{ip} should be rejected");
        }
        assert!(!reject(&Entity::new(EntityType::Ipv4, "133.167.35.116")));
    }

    #[test]
    fn test_flagged_private_ip_rejected() {
        let mut entity = Entity::new(EntityType::Ipv4, "133.167.35.116");
        entity.private_ip = true;
        assert!(reject(&entity));
        assert!(reject(&Entity::new(EntityType::Ipv4, "10.0.0.8")));
    }

    #[test]
    fn test_plain_blocklist_is_case_insensitive() {
        let options = Options {
            blocklist: "Example.com, 1.1.1.1".to_string(),
            ..Default::default()
        };
        let domain = Entity::new(EntityType::Domain, "EXAMPLE.COM");
        assert!(is_rejected(&domain, &options, &no_blocklists()));

        let other = Entity::new(EntityType::Domain, "sub.example.com");
        assert!(!is_rejected(&other, &options, &no_blocklists()));
    }

    #[test]
    fn test_regex_blocklists_apply_by_type() {
        let mut blocklists = BlocklistCache::default();
        blocklists.sync(&Options {
            domain_blocklist_regex: r"\.example\.com$".to_string(),
            ip_blocklist_regex: r"^8\.8\.".to_string(),
            ..Default::default()
        });
        let options = Options::default();

        let domain = Entity::new(EntityType::Domain, "mail.EXAMPLE.com");
        assert!(is_blocklisted(&domain, &options, &blocklists));

        let ip = Entity::new(EntityType::Ipv4, "8.8.4.4");
        assert!(is_blocklisted(&ip, &options, &blocklists));

        // Domain regex does not apply to URLs
        let url = Entity::new(EntityType::Url, "https://mail.example.com").on_demand();
        assert!(!is_blocklisted(&url, &options, &blocklists));
    }

    #[test]
    fn test_hash_passes() {
        let hash = Entity::new(
            EntityType::Hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        );
        assert!(!reject(&hash));
    }
}
