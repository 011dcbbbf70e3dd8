//! Lookup results handed back to the host.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::entity::Entity;

/// Search response body, passed through to the host with merged verdicts,
/// referrer links and screenshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,

    /// Unique `Referer` headers seen while the first hit was scanned
    #[serde(
        rename = "refererLinks",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub referer_links: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchResponse {
    /// True when the search produced no usable hit.
    pub fn is_miss(&self) -> bool {
        self.results.is_empty() || self.total == Some(0)
    }

    pub fn first_hit(&self) -> Option<&Map<String, Value>> {
        self.results.first()
    }

    pub fn first_hit_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.results.first_mut()
    }

    /// Detail resource link of the first hit.
    pub fn result_url(&self) -> Option<&str> {
        self.first_hit()?.get("result")?.as_str()
    }

    /// Screenshot link of the first hit.
    pub fn screenshot_url(&self) -> Option<&str> {
        self.first_hit()?
            .get("screenshot")?
            .as_str()
            .filter(|s| !s.is_empty())
    }

    /// True when the first hit carries `verdicts.overall.malicious == true`.
    pub fn is_malicious(&self) -> bool {
        self.first_hit()
            .and_then(|hit| hit.get("verdicts"))
            .and_then(|v| v.pointer("/overall/malicious"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Transient failure flags attached to volatile results so the host can offer
/// a retry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLimitState {
    pub max_request_queue_limit_hit: bool,
    pub is_connection_reset: bool,
    pub is_gateway_timeout: bool,
    pub is_quota_reached: bool,
    pub is_search_limit_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<Value>,
}

/// Detail payload of a result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Details {
    /// Search hit with merged verdict data
    Search(SearchResponse),
    /// Unknown domain or URL the user may submit for scanning
    CanSubmit {
        #[serde(rename = "canSubmitUrl")]
        can_submit_url: bool,
    },
    /// Transient failure
    SearchLimit(SearchLimitState),
}

impl Details {
    pub fn can_submit_url(&self) -> bool {
        matches!(self, Details::CanSubmit { can_submit_url: true })
    }

    pub fn search_limit(&self) -> Option<&SearchLimitState> {
        match self {
            Details::SearchLimit(state) => Some(state),
            _ => None,
        }
    }

    pub fn search(&self) -> Option<&SearchResponse> {
        match self {
            Details::Search(body) => Some(body),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupData {
    pub summary: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Details>,
}

/// Output unit per entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    pub entity: Entity,
    /// Do not cache: reflects a transient condition
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_volatile: bool,
    pub data: Option<LookupData>,
}

impl LookupResult {
    /// A miss: no detail payload.
    pub fn miss(entity: Entity) -> Self {
        LookupResult {
            entity,
            is_volatile: false,
            data: None,
        }
    }

    pub fn hit(entity: Entity, body: SearchResponse) -> Self {
        LookupResult {
            entity,
            is_volatile: false,
            data: Some(LookupData {
                summary: Vec::new(),
                details: Some(Details::Search(body)),
            }),
        }
    }

    pub fn can_submit(entity: Entity) -> Self {
        LookupResult {
            entity,
            is_volatile: true,
            data: Some(LookupData {
                summary: Vec::new(),
                details: Some(Details::CanSubmit {
                    can_submit_url: true,
                }),
            }),
        }
    }

    pub fn search_limited(entity: Entity, summary: &str, state: SearchLimitState) -> Self {
        LookupResult {
            entity,
            is_volatile: true,
            data: Some(LookupData {
                summary: vec![summary.to_string()],
                details: Some(Details::SearchLimit(state)),
            }),
        }
    }

    pub fn details(&self) -> Option<&Details> {
        self.data.as_ref()?.details.as_ref()
    }
}
