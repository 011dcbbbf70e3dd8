//! Screenshot download.

use base64::{engine::general_purpose, Engine as _};
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;

use crate::config::{DEFAULT_SCREENSHOT_CONTENT_TYPE, HTTP_STATUS_NOT_FOUND, HTTP_STATUS_OK};
use crate::error_handling::{classify, HttpOutcome, LookupError, StageError, TransportFailure};

use super::UrlscanClient;

/// Encodes image bytes as a `data:` URI.
pub(crate) fn to_data_uri(content_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        content_type,
        general_purpose::STANDARD.encode(bytes)
    )
}

fn transport_error(error: &reqwest::Error) -> StageError {
    let outcome = HttpOutcome::Transport(TransportFailure::from_reqwest(error));
    match classify(&outcome).into_stage_result() {
        Err(e) => e,
        // Transport outcomes never classify as success or miss
        Ok(_) => LookupError::Http(error.to_string()).into(),
    }
}

impl UrlscanClient {
    /// Downloads a screenshot as a base64 `data:` URI.
    ///
    /// urlscan.io serves a placeholder image with a 404 while a screenshot is
    /// missing, so 200 and 404 are both accepted. An empty body yields
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Any other status is a hard [`LookupError::Screenshot`]; transport
    /// failures classify like every other request.
    pub async fn fetch_screenshot(
        &self,
        screenshot_url: &str,
        api_key: Option<&str>,
    ) -> Result<Option<String>, StageError> {
        let url = match Url::parse(screenshot_url) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Skipping malformed screenshot link {}: {}", screenshot_url, e);
                return Ok(None);
            }
        };
        let api_key = api_key.filter(|_| self.is_same_origin(&url));

        let response = Self::with_api_key(self.http.get(url), api_key)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status().as_u16();
        if status != HTTP_STATUS_OK && status != HTTP_STATUS_NOT_FOUND {
            return Err(LookupError::Screenshot { status }.into());
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_SCREENSHOT_CONTENT_TYPE)
            .to_string();
        let bytes = response.bytes().await.map_err(|e| transport_error(&e))?;

        if bytes.is_empty() {
            log::debug!("Empty screenshot body from {}", screenshot_url);
            return Ok(None);
        }
        Ok(Some(to_data_uri(&content_type, &bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_format() {
        assert_eq!(
            to_data_uri("image/png", b"\x89PNG"),
            "data:image/png;base64,iVBORw=="
        );
    }
}
