//! Data model: entities in, results out.

mod entity;
mod result;

pub use entity::{Entity, EntityType, RequestContext, RequestType};
pub use result::{Details, LookupData, LookupResult, SearchLimitState, SearchResponse};
