//! Scan submission endpoint.

use serde::Serialize;

use crate::error_handling::{classify, Classification};

use super::UrlscanClient;

/// Body of a scan submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSubmission {
    pub url: String,
    /// `"on"` for public scans; omitted for the account default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<&'static str>,
    pub tags: Vec<String>,
}

impl ScanSubmission {
    pub fn new(url: impl Into<String>, raw_tags: &str, app_tag: &str, public: bool) -> Self {
        ScanSubmission {
            url: url.into(),
            public: public.then_some("on"),
            tags: build_tags(raw_tags, app_tag),
        }
    }
}

/// Splits comma-separated user tags and appends the application tag.
///
/// Tags are trimmed, empties dropped, and duplicates removed keeping the first
/// occurrence.
pub fn build_tags(raw: &str, app_tag: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw
        .split(',')
        .chain(std::iter::once(app_tag))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        if !tags.iter().any(|seen| seen == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

impl UrlscanClient {
    /// Submits a URL for scanning and classifies the response.
    ///
    /// The caller turns transient classifications into a retryable state.
    pub async fn submit_scan(
        &self,
        submission: &ScanSubmission,
        api_key: Option<&str>,
    ) -> Classification {
        log::debug!(
            "Submitting {} for scanning with tags {:?}",
            submission.url,
            submission.tags
        );
        let request = Self::with_api_key(self.http.post(self.scan_url()), api_key).json(submission);
        classify(&Self::send_json(request).await)
    }
}
