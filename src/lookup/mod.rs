//! Batch lookups.
//!
//! Every eligible entity runs the [`pipeline`] through the shared
//! [`RequestDispatcher`]. Transient failures become volatile results carrying
//! a [`SearchLimitState`]; hard failures are collected per entity so one bad
//! lookup does not discard the rest of the batch.

mod pipeline;

use futures::future::join_all;
use serde::Serialize;

use crate::config::{Options, SUMMARY_LIMIT_REACHED, SUMMARY_QUOTA_EXCEEDED};
use crate::error_handling::{LimitKind, LookupError, LookupStats, StageError};
use crate::fetch::UrlscanClient;
use crate::initialization::{DispatchError, RequestDispatcher};
use crate::models::{Entity, LookupResult, SearchLimitState};

pub use pipeline::{build_lookup_result, can_submit_url, lookup_entity};

/// A hard failure for one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupFailure {
    pub entity: Entity,
    pub error: LookupError,
}

/// Outcome of a batch: results in input order, plus per-entity failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LookupBatch {
    pub results: Vec<LookupResult>,
    pub errors: Vec<LookupFailure>,
}

impl LookupBatch {
    /// Fail-whole-batch view: any hard failure discards every result.
    pub fn into_result(self) -> Result<Vec<LookupResult>, Vec<LookupFailure>> {
        if self.errors.is_empty() {
            Ok(self.results)
        } else {
            Err(self.errors)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty() && self.errors.is_empty()
    }
}

/// What became of one dispatched entity.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityOutcome {
    /// A result for the host, possibly volatile
    Resolved(LookupResult),
    /// Filtered out by `malicious_only`
    Dropped,
    Failed(LookupError),
}

/// Builds the retryable state for a transient failure.
///
/// A reached quota triggers a quota fetch; its failure is logged and the
/// state is returned without a snapshot.
pub async fn search_limit_state(
    client: &UrlscanClient,
    kind: LimitKind,
    options: &Options,
) -> SearchLimitState {
    let mut state = kind.to_state();
    if kind == LimitKind::QuotaReached {
        match client.fetch_quota(options.api_key()).await {
            Ok(quota) => state.quota = Some(quota),
            Err(e) => log::error!("{}", e),
        }
    }
    state
}

fn limit_summary(kind: LimitKind) -> &'static str {
    if kind == LimitKind::QuotaReached {
        SUMMARY_QUOTA_EXCEEDED
    } else {
        SUMMARY_LIMIT_REACHED
    }
}

/// Dispatches one entity and resolves its outcome.
pub async fn lookup_one(
    client: &UrlscanClient,
    dispatcher: &RequestDispatcher,
    entity: &Entity,
    options: &Options,
    stats: &LookupStats,
) -> EntityOutcome {
    let outcome = match dispatcher
        .submit(|| lookup_entity(client, entity, options))
        .await
    {
        Ok(outcome) => outcome,
        Err(DispatchError::QueueFull(_)) => Err(StageError::Limit(LimitKind::QueueOverflow)),
        Err(e @ DispatchError::Closed) => Err(LookupError::Http(e.to_string()).into()),
    };

    match outcome {
        Ok(Some(result)) => EntityOutcome::Resolved(result),
        Ok(None) => EntityOutcome::Dropped,
        Err(StageError::Limit(kind)) => {
            log::debug!("{} while looking up {}", kind, entity.value);
            stats.increment(kind);
            let state = search_limit_state(client, kind, options).await;
            EntityOutcome::Resolved(LookupResult::search_limited(
                entity.clone(),
                limit_summary(kind),
                state,
            ))
        }
        Err(StageError::Hard(error)) => {
            log::error!("Lookup of {} failed: {}", entity.value, error);
            EntityOutcome::Failed(error)
        }
    }
}

/// Looks up every entity concurrently and waits for all of them.
///
/// `entities` must already be filtered; an empty slice returns at once
/// without touching the network.
pub async fn lookup_all(
    client: &UrlscanClient,
    dispatcher: &RequestDispatcher,
    entities: &[Entity],
    options: &Options,
) -> LookupBatch {
    if entities.is_empty() {
        log::trace!("No valid indicators");
        return LookupBatch::default();
    }

    let stats = LookupStats::new();
    let outcomes = join_all(
        entities
            .iter()
            .map(|entity| lookup_one(client, dispatcher, entity, options, &stats)),
    )
    .await;
    stats.log_summary(entities.len());

    let mut batch = LookupBatch::default();
    for (entity, outcome) in entities.iter().zip(outcomes) {
        match outcome {
            EntityOutcome::Resolved(result) => batch.results.push(result),
            EntityOutcome::Dropped => {}
            EntityOutcome::Failed(error) => batch.errors.push(LookupFailure {
                entity: entity.clone(),
                error,
            }),
        }
    }
    log::trace!(
        "Lookup batch finished: {} results, {} errors",
        batch.results.len(),
        batch.errors.len()
    );
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityType;

    #[test]
    fn test_into_result_fails_whole_batch() {
        let entity = Entity::new(EntityType::Domain, "example.com");
        let batch = LookupBatch {
            results: vec![LookupResult::miss(entity.clone())],
            errors: vec![LookupFailure {
                entity,
                error: LookupError::Unauthorized,
            }],
        };
        let errors = batch.into_result().expect_err("one failure fails the batch");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_into_result_without_errors() {
        let entity = Entity::new(EntityType::Domain, "example.com");
        let batch = LookupBatch {
            results: vec![LookupResult::miss(entity)],
            errors: Vec::new(),
        };
        assert_eq!(batch.into_result().map(|r| r.len()), Ok(1));
    }

    #[test]
    fn test_limit_summaries() {
        assert_eq!(limit_summary(LimitKind::QuotaReached), "Search Quota Exceeded");
        for kind in [
            LimitKind::QueueOverflow,
            LimitKind::ConnectionReset,
            LimitKind::GatewayTimeout,
        ] {
            assert_eq!(limit_summary(kind), "Search Limit Reached");
        }
    }
}
