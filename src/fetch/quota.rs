//! Account quota endpoint.

use serde_json::Value;

use crate::config::HTTP_STATUS_NOT_FOUND;
use crate::error_handling::{classify, Classification, LookupError};

use super::UrlscanClient;

impl UrlscanClient {
    /// Fetches the API key's quota snapshot.
    ///
    /// # Errors
    ///
    /// Every failure, transient or not, is reported as
    /// [`LookupError::Quota`]; callers attach the quota on a best-effort basis.
    pub async fn fetch_quota(&self, api_key: Option<&str>) -> Result<Value, LookupError> {
        let request = Self::with_api_key(self.http.get(self.quota_url()), api_key);
        let outcome = Self::send_json(request).await;

        let cause = match classify(&outcome) {
            Classification::Success(body) => return Ok(body.unwrap_or(Value::Null)),
            Classification::Miss => LookupError::Status {
                status: HTTP_STATUS_NOT_FOUND,
                message: "Not Found".to_string(),
                description: None,
            },
            Classification::Unauthorized => LookupError::Unauthorized,
            Classification::Error(e) => e,
            transient => LookupError::Http(
                transient
                    .limit_kind()
                    .map(|kind| kind.to_string())
                    .unwrap_or_default(),
            ),
        };
        Err(LookupError::Quota(Box::new(cause)))
    }
}
