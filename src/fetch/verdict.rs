//! Scan result endpoint: verdicts and referrer links of a hit.

use reqwest::Url;
use serde_json::Value;

use crate::error_handling::{classify, StageError};

use super::UrlscanClient;

/// Data merged into the first search hit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerdictData {
    /// The result's `verdicts` object, if present
    pub verdicts: Option<Value>,
    pub referer_links: Vec<String>,
}

impl VerdictData {
    fn from_result(body: &Value) -> Self {
        VerdictData {
            verdicts: body.get("verdicts").cloned(),
            referer_links: extract_referer_links(body),
        }
    }
}

/// Collects the distinct non-empty `Referer` headers of every request made
/// during the scan, in first-seen order.
pub fn extract_referer_links(result: &Value) -> Vec<String> {
    let Some(requests) = result.pointer("/data/requests").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut links: Vec<String> = Vec::new();
    for referer in requests
        .iter()
        .filter_map(|r| r.pointer("/request/request/headers/Referer"))
        .filter_map(Value::as_str)
        .filter(|r| !r.is_empty())
    {
        if !links.iter().any(|seen| seen == referer) {
            links.push(referer.to_string());
        }
    }
    links
}

impl UrlscanClient {
    /// Fetches the scan result behind a hit's `result` link.
    ///
    /// `Ok(None)` when the result is gone (404) or the link is malformed.
    pub async fn fetch_verdicts(
        &self,
        result_url: &str,
        api_key: Option<&str>,
    ) -> Result<Option<VerdictData>, StageError> {
        let url = match Url::parse(result_url) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Skipping malformed result link {}: {}", result_url, e);
                return Ok(None);
            }
        };
        let api_key = api_key.filter(|_| self.is_same_origin(&url));

        let request = Self::with_api_key(self.http.get(url), api_key);
        let outcome = Self::send_json(request).await;

        let Some(body) = classify(&outcome).into_stage_result()? else {
            log::debug!("No scan result at {}", result_url);
            return Ok(None);
        };
        Ok(Some(VerdictData::from_result(&body)))
    }
}
