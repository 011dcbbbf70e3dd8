//! Search endpoint.

use crate::config::{Options, SEARCH_RESULT_SIZE};
use crate::error_handling::{classify, LookupError, StageError};
use crate::models::{Entity, SearchResponse};

use super::UrlscanClient;

/// Builds the urlscan.io search query for an entity.
///
/// With `include_tasked_indicators`, domain and URL queries also match the
/// submitted task, not only the final page.
pub fn build_query(entity: &Entity, include_tasked_indicators: bool) -> String {
    let value = &entity.value;
    if entity.is_ip() {
        format!("page.ip:\"{value}\"")
    } else if entity.is_domain() {
        if include_tasked_indicators {
            format!("page.domain:\"{value}\" OR task.domain:\"{value}\"")
        } else {
            format!("page.domain:\"{value}\"")
        }
    } else if entity.is_hash() {
        format!("hash:\"{value}\"")
    } else if include_tasked_indicators {
        format!("page.url:\"{value}\" OR task.url:\"{value}\"")
    } else {
        format!("page.url:\"{value}\"")
    }
}

impl UrlscanClient {
    /// Searches urlscan.io for `entity`.
    ///
    /// `Ok(None)` is a miss: a 404, or a 200 without results.
    pub async fn search(
        &self,
        entity: &Entity,
        options: &Options,
    ) -> Result<Option<SearchResponse>, StageError> {
        let query = build_query(entity, options.include_tasked_indicators);
        log::trace!("Searching urlscan for {}: {}", entity.value, query);

        let request = self
            .http
            .get(self.search_url())
            .query(&[("q", query.as_str()), ("size", SEARCH_RESULT_SIZE)]);
        let outcome = Self::send_json(Self::with_api_key(request, options.api_key())).await;

        let Some(body) = classify(&outcome).into_stage_result()? else {
            return Ok(None);
        };
        let response: SearchResponse = serde_json::from_value(body)
            .map_err(|e| LookupError::Decode(e.to_string()))?;

        if response.is_miss() {
            log::debug!("No search results for {}", entity.value);
            return Ok(None);
        }
        Ok(Some(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityType;

    #[test]
    fn test_query_per_entity_type() {
        let ip = Entity::new(EntityType::Ipv4, "133.167.35.116");
        assert_eq!(
            build_query(&ip, false),
            "page.ip:\"133.167.35.116\""
        );

        let hash = Entity::new(EntityType::Hash, "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(
            build_query(&hash, true),
            "hash:\"d41d8cd98f00b204e9800998ecf8427e\""
        );
    }

    #[test]
    fn test_tasked_indicators_widen_domain_and_url_queries() {
        let domain = Entity::new(EntityType::Domain, "example.com");
        assert_eq!(
            build_query(&domain, false),
            "page.domain:\"example.com\""
        );
        assert_eq!(
            build_query(&domain, true),
            "page.domain:\"example.com\" OR task.domain:\"example.com\""
        );

        let url = Entity::new(EntityType::Url, "https://example.com/a");
        assert_eq!(
            build_query(&url, true),
            "page.url:\"https://example.com/a\" OR task.url:\"https://example.com/a\""
        );
    }

    #[test]
    fn test_cidr_searches_as_ip() {
        let cidr = Entity::new(EntityType::Ipv4Cidr, "10.0.0.0/8");
        assert_eq!(
            build_query(&cidr, false),
            "page.ip:\"10.0.0.0/8\""
        );
    }
}
