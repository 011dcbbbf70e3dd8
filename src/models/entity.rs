//! Indicator entities submitted for enrichment.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Kind of indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "IPv4")]
    Ipv4,
    #[serde(rename = "IPv6")]
    Ipv6,
    #[serde(rename = "IPv4CIDR")]
    Ipv4Cidr,
    #[serde(rename = "domain")]
    Domain,
    #[serde(rename = "url")]
    Url,
    /// MD5, SHA1 or SHA256 file hash
    #[serde(rename = "hash", alias = "MD5", alias = "SHA1", alias = "SHA256", alias = "sha256")]
    Hash,
}

impl EntityType {
    /// Infers the indicator type of a raw value.
    ///
    /// Returns `None` for values that are not a recognizable IP, CIDR, hash,
    /// URL or domain.
    pub fn infer(value: &str) -> Option<EntityType> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        match value.parse::<IpAddr>() {
            Ok(IpAddr::V4(_)) => return Some(EntityType::Ipv4),
            Ok(IpAddr::V6(_)) => return Some(EntityType::Ipv6),
            Err(_) => {}
        }

        if let Some((addr, prefix)) = value.split_once('/') {
            if addr.parse::<std::net::Ipv4Addr>().is_ok()
                && prefix.parse::<u8>().is_ok_and(|p| p <= 32)
            {
                return Some(EntityType::Ipv4Cidr);
            }
        }

        if matches!(value.len(), 32 | 40 | 64) && value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Some(EntityType::Hash);
        }

        if value.contains("://") {
            return url::Url::parse(value).ok().map(|_| EntityType::Url);
        }

        let looks_like_domain = value.contains('.')
            && !value.starts_with('.')
            && !value.ends_with('.')
            && value
                .chars()
                .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == '_');
        looks_like_domain.then_some(EntityType::Domain)
    }
}

/// How the host triggered the lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RequestType {
    /// The user explicitly asked for this entity
    OnDemand,
    /// Entity was picked up automatically
    #[default]
    #[serde(other)]
    Passive,
}

/// Context supplied by the host alongside each entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub request_type: RequestType,
}

/// An observable indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub value: String,
    /// Host-supplied private address flag
    #[serde(default, rename = "isPrivateIP")]
    pub private_ip: bool,
    #[serde(default)]
    pub request_context: RequestContext,
}

impl Entity {
    pub fn new(entity_type: EntityType, value: impl Into<String>) -> Self {
        Entity {
            entity_type,
            value: value.into(),
            private_ip: false,
            request_context: RequestContext::default(),
        }
    }

    /// Marks the entity as part of an on-demand request.
    pub fn on_demand(mut self) -> Self {
        self.request_context.request_type = RequestType::OnDemand;
        self
    }

    /// Builds an entity from a raw value, inferring its type.
    pub fn infer(value: &str) -> Option<Self> {
        EntityType::infer(value).map(|t| Entity::new(t, value.trim()))
    }

    pub fn is_ip(&self) -> bool {
        matches!(
            self.entity_type,
            EntityType::Ipv4 | EntityType::Ipv6 | EntityType::Ipv4Cidr
        )
    }

    pub fn is_ipv4(&self) -> bool {
        matches!(self.entity_type, EntityType::Ipv4 | EntityType::Ipv4Cidr)
    }

    pub fn is_domain(&self) -> bool {
        self.entity_type == EntityType::Domain
    }

    pub fn is_url(&self) -> bool {
        self.entity_type == EntityType::Url
    }

    pub fn is_hash(&self) -> bool {
        self.entity_type == EntityType::Hash
    }

    pub fn is_on_demand(&self) -> bool {
        self.request_context.request_type == RequestType::OnDemand
    }

    /// True when the host flagged the entity as private or the address
    /// itself is loopback, link-local or in a private range.
    pub fn is_private_ip(&self) -> bool {
        if !self.is_ip() {
            return false;
        }
        if self.private_ip {
            return true;
        }
        let addr = self.value.split('/').next().unwrap_or_default();
        match addr.parse::<IpAddr>() {
            Ok(IpAddr::V4(v4)) => v4.is_private() || v4.is_loopback() || v4.is_link_local(),
            Ok(IpAddr::V6(v6)) => {
                let first = v6.segments()[0];
                v6.is_loopback() || (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
            }
            Err(_) => false,
        }
    }
}
