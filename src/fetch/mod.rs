//! urlscan.io API client.
//!
//! Each endpoint lives in its own submodule; this module owns the shared
//! client, endpoint resolution and the conversion of a `reqwest` exchange into
//! an [`HttpOutcome`] for classification.

mod quota;
mod screenshot;
mod search;
mod submit;
mod verdict;

use std::sync::Arc;

use reqwest::{RequestBuilder, Url};
use serde_json::Value;

use crate::config::{Config, QUOTA_PATH, SCAN_PATH, SEARCH_PATH};
use crate::error_handling::{HttpOutcome, InitializationError, TransportFailure};

pub use search::build_query;
pub use submit::{build_tags, ScanSubmission};
pub use verdict::{extract_referer_links, VerdictData};

/// Header carrying the urlscan.io API key.
const API_KEY_HEADER: &str = "API-Key";

/// Client for the urlscan.io endpoints used by lookups and actions.
#[derive(Clone)]
pub struct UrlscanClient {
    http: Arc<reqwest::Client>,
    base_url: Url,
}

impl UrlscanClient {
    /// Creates a client rooted at `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::BaseUrlError` when the base URL does not
    /// parse.
    pub fn new(http: Arc<reqwest::Client>, config: &Config) -> Result<Self, InitializationError> {
        // A trailing slash makes relative joins append instead of replace
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| InitializationError::BaseUrlError(config.base_url.clone(), e))?;
        Ok(UrlscanClient { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn search_url(&self) -> Url {
        self.endpoint(SEARCH_PATH)
    }

    fn scan_url(&self) -> Url {
        self.endpoint(SCAN_PATH)
    }

    fn quota_url(&self) -> Url {
        self.endpoint(QUOTA_PATH)
    }

    fn endpoint(&self, path: &str) -> Url {
        // Paths are compile-time constants without a scheme, so the join cannot fail
        self.base_url
            .join(path)
            .unwrap_or_else(|_| self.base_url.clone())
    }

    /// True when `url` points at the configured urlscan.io origin.
    ///
    /// The API key is only attached to links on this origin.
    fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.base_url.origin()
    }

    fn with_api_key(request: RequestBuilder, api_key: Option<&str>) -> RequestBuilder {
        match api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    /// Sends a request expecting a JSON body.
    async fn send_json(request: RequestBuilder) -> HttpOutcome {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return HttpOutcome::Transport(TransportFailure::from_reqwest(&e)),
        };

        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(bytes) => HttpOutcome::Response {
                status,
                body: serde_json::from_slice::<Value>(&bytes).ok(),
            },
            Err(e) => HttpOutcome::Transport(TransportFailure::from_reqwest(&e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> UrlscanClient {
        let config = Config {
            base_url: base_url.to_string(),
            ..Default::default()
        };
        UrlscanClient::new(Arc::new(reqwest::Client::new()), &config).expect("valid base url")
    }

    #[test]
    fn test_endpoints_join_under_base_path() {
        let client = client("http://127.0.0.1:8080/proxy");
        assert_eq!(
            client.search_url().as_str(),
            "http://127.0.0.1:8080/proxy/api/v1/search"
        );
        assert_eq!(
            client.quota_url().as_str(),
            "http://127.0.0.1:8080/proxy/user/quotas"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = Config {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        let result = UrlscanClient::new(Arc::new(reqwest::Client::new()), &config);
        assert!(matches!(result, Err(InitializationError::BaseUrlError(..))));
    }

    #[test]
    fn test_api_key_only_sent_to_same_origin() {
        let client = client("https://urlscan.io");
        let own = Url::parse("https://urlscan.io/api/v1/result/abc/").expect("url");
        let foreign = Url::parse("https://cdn.example.com/shot.png").expect("url");
        assert!(client.is_same_origin(&own));
        assert!(!client.is_same_origin(&foreign));
    }
}
