//! Single-entity lookup pipeline: search, verdicts, screenshot.

use serde_json::Value;

use crate::config::Options;
use crate::error_handling::StageError;
use crate::fetch::UrlscanClient;
use crate::models::{Entity, LookupResult, SearchResponse};

/// Runs the full pipeline for one entity.
///
/// Returns `Ok(None)` when `malicious_only` filters the entity out.
///
/// # Errors
///
/// The first stage failure aborts the pipeline. Transient failures come back
/// as [`StageError::Limit`] so the caller can degrade the result instead of
/// failing it.
pub async fn lookup_entity(
    client: &UrlscanClient,
    entity: &Entity,
    options: &Options,
) -> Result<Option<LookupResult>, StageError> {
    let mut body = client.search(entity, options).await?;

    if let Some(body) = body.as_mut() {
        merge_verdicts(client, body, options).await?;
        if options.download_screenshot {
            attach_screenshot(client, body, options).await?;
        }
    }

    Ok(build_lookup_result(entity, body, options))
}

/// Merges the first hit's scan verdicts and referrer links into `body`.
async fn merge_verdicts(
    client: &UrlscanClient,
    body: &mut SearchResponse,
    options: &Options,
) -> Result<(), StageError> {
    let Some(result_url) = body.result_url().map(str::to_string) else {
        return Ok(());
    };

    let Some(verdict) = client.fetch_verdicts(&result_url, options.api_key()).await? else {
        return Ok(());
    };

    if let Some(hit) = body.first_hit_mut() {
        hit.insert(
            "verdicts".to_string(),
            verdict.verdicts.unwrap_or(Value::Null),
        );
    }
    body.referer_links = Some(verdict.referer_links);
    Ok(())
}

async fn attach_screenshot(
    client: &UrlscanClient,
    body: &mut SearchResponse,
    options: &Options,
) -> Result<(), StageError> {
    let Some(screenshot_url) = body.screenshot_url().map(str::to_string) else {
        return Ok(());
    };

    let screenshot = client
        .fetch_screenshot(&screenshot_url, options.api_key())
        .await?;
    if let (Some(data_uri), Some(hit)) = (screenshot, body.first_hit_mut()) {
        hit.insert("screenshotBase64".to_string(), Value::String(data_uri));
    }
    Ok(())
}

/// True when the user may submit this unknown entity for scanning.
pub fn can_submit_url(entity: &Entity, options: &Options) -> bool {
    options.submit_url
        && options.api_key().is_some()
        && (entity.is_domain() || entity.is_url())
        && entity.is_on_demand()
}

/// Shapes the pipeline output into the host-facing result.
///
/// `body` is `None` on a miss. Returns `None` when `malicious_only` is set and
/// the first hit is not flagged malicious; a miss is never malicious.
pub fn build_lookup_result(
    entity: &Entity,
    body: Option<SearchResponse>,
    options: &Options,
) -> Option<LookupResult> {
    let malicious = body.as_ref().is_some_and(SearchResponse::is_malicious);
    if options.malicious_only && !malicious {
        log::debug!("Dropping non-malicious result for {}", entity.value);
        return None;
    }

    let result = match body {
        Some(body) => LookupResult::hit(entity.clone(), body),
        None if can_submit_url(entity, options) => LookupResult::can_submit(entity.clone()),
        None => LookupResult::miss(entity.clone()),
    };
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Details, EntityType};
    use serde_json::json;

    fn submit_options() -> Options {
        Options {
            api_key: "key".to_string(),
            submit_url: true,
            ..Default::default()
        }
    }

    fn body(value: Value) -> SearchResponse {
        serde_json::from_value(value).expect("search body")
    }

    #[test]
    fn test_miss_on_demand_domain_can_submit() {
        let entity = Entity::new(EntityType::Domain, "fresh.test").on_demand();
        let result = build_lookup_result(&entity, None, &submit_options()).expect("kept");
        assert!(result.is_volatile);
        assert!(result.details().is_some_and(Details::can_submit_url));
    }

    #[test]
    fn test_miss_without_permission_is_plain_miss() {
        let entity = Entity::new(EntityType::Domain, "fresh.test").on_demand();
        let options = Options {
            api_key: String::new(),
            ..submit_options()
        };
        let result = build_lookup_result(&entity, None, &options).expect("kept");
        assert!(result.data.is_none());

        // Passive lookups never offer submission
        let passive = Entity::new(EntityType::Domain, "fresh.test");
        let result = build_lookup_result(&passive, None, &submit_options()).expect("kept");
        assert!(result.data.is_none());

        // Neither do IPs
        let ip = Entity::new(EntityType::Ipv4, "8.8.8.8").on_demand();
        let result = build_lookup_result(&ip, None, &submit_options()).expect("kept");
        assert!(result.data.is_none());
    }

    #[test]
    fn test_malicious_only_drops_benign_hit_and_miss() {
        let entity = Entity::new(EntityType::Domain, "example.com");
        let options = Options {
            malicious_only: true,
            ..Default::default()
        };
        let benign = body(json!({
            "results": [{"verdicts": {"overall": {"malicious": false}}}],
            "total": 1
        }));
        assert!(build_lookup_result(&entity, Some(benign), &options).is_none());
        assert!(build_lookup_result(&entity, None, &options).is_none());
    }

    #[test]
    fn test_malicious_only_keeps_malicious_hit() {
        let entity = Entity::new(EntityType::Domain, "bad.test");
        let options = Options {
            malicious_only: true,
            ..Default::default()
        };
        let malicious = body(json!({
            "results": [{"verdicts": {"overall": {"malicious": true}}}],
            "total": 1
        }));
        let result = build_lookup_result(&entity, Some(malicious), &options).expect("kept");
        assert!(result.details().and_then(Details::search).is_some());
        assert!(!result.is_volatile);
    }
}
