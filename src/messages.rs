//! UI-triggered actions.
//!
//! The host forwards button presses as JSON messages tagged by `action`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::config::{Options, HTTP_STATUS_NOT_FOUND, SUMMARY_NO_RESULTS_ON_RETRY};
use crate::error_handling::{LookupError, StageError};
use crate::fetch::{ScanSubmission, UrlscanClient};
use crate::lookup::search_limit_state;
use crate::models::{Entity, LookupData, LookupResult, SearchLimitState};

/// An action requested from the UI.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Show the API key's remaining quota
    GetQuota,
    /// Run the full lookup again for a volatile result
    RetryLookup { entity: Entity },
    /// Submit an unknown domain or URL for scanning
    SubmitUrl { data: SubmitRequest },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub entity: Entity,
    /// Comma-separated user tags
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub submit_as_public: bool,
}

/// Reply to a [`Message`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageResponse {
    Quota {
        quota: Value,
    },
    Retry(LookupResult),
    /// Submission response with a synthesized first hit
    Submitted(Value),
    /// Submission hit a transient limit; the form stays available
    SubmitLimited {
        #[serde(rename = "canSubmitUrl")]
        can_submit_url: bool,
        #[serde(flatten)]
        state: SearchLimitState,
    },
}

/// Retry reply when the entity produced nothing to show.
pub fn no_results_on_retry(entity: &Entity) -> LookupResult {
    LookupResult {
        entity: entity.clone(),
        is_volatile: false,
        data: Some(LookupData {
            summary: vec![SUMMARY_NO_RESULTS_ON_RETRY.to_string()],
            details: None,
        }),
    }
}

/// Shapes a scan submission response like a search body whose first hit is
/// the new scan, so the UI can render it immediately.
pub fn synthesize_submission(body: Value, entity: &Entity) -> Value {
    let mut details = match body {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let field = |name: &str| details.get(name).cloned().unwrap_or(Value::Null);

    let hit = json!({
        "justSubmitted": true,
        "_id": field("uuid"),
        "task": { "visibility": field("visibility") },
        "page": {
            "domain": entity.value,
            "url": field("url"),
        },
    });
    details.insert("results".to_string(), Value::Array(vec![hit]));
    Value::Object(details)
}

/// Submits a URL for scanning.
///
/// # Errors
///
/// Hard failures propagate; transient ones become
/// [`MessageResponse::SubmitLimited`].
pub async fn submit_url(
    client: &UrlscanClient,
    request: &SubmitRequest,
    app_tag: &str,
    options: &Options,
) -> Result<MessageResponse, LookupError> {
    let submission = ScanSubmission::new(
        request.entity.value.clone(),
        &request.tags,
        app_tag,
        request.submit_as_public,
    );
    let classification = client.submit_scan(&submission, options.api_key()).await;

    match classification.into_stage_result() {
        Ok(Some(body)) => {
            let details = synthesize_submission(body, &request.entity);
            log::trace!("Result of url submission: {}", details);
            Ok(MessageResponse::Submitted(details))
        }
        Ok(None) => Err(LookupError::Status {
            status: HTTP_STATUS_NOT_FOUND,
            message: "Not Found".to_string(),
            description: None,
        }),
        Err(StageError::Limit(kind)) => {
            log::warn!("{} while submitting {}", kind, request.entity.value);
            Ok(MessageResponse::SubmitLimited {
                can_submit_url: true,
                state: search_limit_state(client, kind, options).await,
            })
        }
        Err(StageError::Hard(e)) => {
            log::error!("Encountered error submitting url: {}", e);
            Err(e)
        }
    }
}
