//! The integration: startup state plus the host-facing entry points.

use std::sync::{Mutex, PoisonError};

use crate::config::{Config, Options, INVALID_REGEX_MESSAGE};
use crate::error_handling::{InitializationError, LookupError, LookupStats, ValidationError};
use crate::fetch::UrlscanClient;
use crate::filter::{compile_blocklist_regex, is_rejected, BlocklistCache};
use crate::initialization::{init_client, init_dispatcher, RequestDispatcher};
use crate::lookup::{lookup_all, lookup_one, EntityOutcome, LookupBatch};
use crate::messages::{no_results_on_retry, submit_url, Message, MessageResponse};
use crate::models::Entity;

/// urlscan.io enrichment integration.
///
/// Owns every piece of state that outlives a single batch: the HTTP client,
/// the request dispatcher and the compiled blocklist regexes. Construct one
/// at startup and share it across batches.
pub struct Integration {
    client: UrlscanClient,
    dispatcher: RequestDispatcher,
    blocklists: Mutex<BlocklistCache>,
    submission_tag: String,
}

impl Integration {
    /// Builds the HTTP client and dispatcher from `config`.
    ///
    /// # Errors
    ///
    /// Returns an `InitializationError` if the client cannot be built (bad
    /// proxy, unreadable TLS files) or the base URL is invalid.
    pub fn startup(config: &Config) -> Result<Self, InitializationError> {
        let http = init_client(config)?;
        let client = UrlscanClient::new(http, config)?;
        log::debug!("urlscan integration started against {}", client.base_url());

        Ok(Integration {
            client,
            dispatcher: init_dispatcher(config),
            blocklists: Mutex::new(BlocklistCache::default()),
            submission_tag: config.submission_tag.clone(),
        })
    }

    /// Entities that pass validation and the blocklists, in input order.
    fn eligible(&self, entities: &[Entity], options: &Options) -> Vec<Entity> {
        let mut blocklists = self
            .blocklists
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        blocklists.sync(options);

        entities
            .iter()
            .filter(|entity| !is_rejected(entity, options, &blocklists))
            .cloned()
            .collect()
    }

    /// Looks up a batch of entities.
    ///
    /// Rejected entities are skipped silently. The batch always completes:
    /// transient failures become volatile results and hard failures are
    /// reported per entity in [`LookupBatch::errors`].
    pub async fn lookup(&self, entities: &[Entity], options: &Options) -> LookupBatch {
        let eligible = self.eligible(entities, options);
        log::debug!(
            "Looking up {} of {} entities",
            eligible.len(),
            entities.len()
        );
        lookup_all(&self.client, &self.dispatcher, &eligible, options).await
    }

    /// Handles a UI action.
    ///
    /// # Errors
    ///
    /// Returns the hard [`LookupError`] of the underlying request.
    pub async fn on_message(
        &self,
        message: Message,
        options: &Options,
    ) -> Result<MessageResponse, LookupError> {
        match message {
            Message::GetQuota => {
                let quota = self.client.fetch_quota(options.api_key()).await?;
                Ok(MessageResponse::Quota { quota })
            }
            Message::RetryLookup { entity } => self.retry(&entity, options).await,
            Message::SubmitUrl { data } => {
                submit_url(&self.client, &data, &self.submission_tag, options).await
            }
        }
    }

    async fn retry(
        &self,
        entity: &Entity,
        options: &Options,
    ) -> Result<MessageResponse, LookupError> {
        let eligible = self.eligible(std::slice::from_ref(entity), options);
        let Some(entity) = eligible.first() else {
            return Ok(MessageResponse::Retry(no_results_on_retry(entity)));
        };

        let stats = LookupStats::new();
        match lookup_one(&self.client, &self.dispatcher, entity, options, &stats).await {
            EntityOutcome::Resolved(result) if result.data.is_some() => {
                Ok(MessageResponse::Retry(result))
            }
            EntityOutcome::Resolved(_) | EntityOutcome::Dropped => {
                Ok(MessageResponse::Retry(no_results_on_retry(entity)))
            }
            EntityOutcome::Failed(error) => Err(error),
        }
    }
}

/// Validates user options.
///
/// Returns one error per invalid blocklist regex; an empty vector means the
/// options are usable.
pub fn validate_options(options: &Options) -> Vec<ValidationError> {
    [
        ("domainBlocklistRegex", &options.domain_blocklist_regex),
        ("ipBlocklistRegex", &options.ip_blocklist_regex),
    ]
    .into_iter()
    .filter(|(_, pattern)| !pattern.is_empty())
    .filter(|(_, pattern)| compile_blocklist_regex(pattern).is_err())
    .map(|(key, _)| ValidationError {
        key: key.to_string(),
        message: INVALID_REGEX_MESSAGE.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_options_have_no_errors() {
        let options = Options {
            domain_blocklist_regex: r"\.corp$".to_string(),
            ip_blocklist_regex: String::new(),
            ..Default::default()
        };
        assert!(validate_options(&options).is_empty());
    }

    #[test]
    fn test_invalid_regexes_reported_by_key() {
        let options = Options {
            domain_blocklist_regex: "(".to_string(),
            ip_blocklist_regex: "[".to_string(),
            ..Default::default()
        };
        let errors = validate_options(&options);
        let keys: Vec<&str> = errors.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["domainBlocklistRegex", "ipBlocklistRegex"]);
        assert!(errors.iter().all(|e| e.message == INVALID_REGEX_MESSAGE));
    }

    #[test]
    fn test_startup_rejects_bad_base_url() {
        let config = Config {
            base_url: "::not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            Integration::startup(&config),
            Err(InitializationError::BaseUrlError(..))
        ));
    }
}
