use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::document::Document;
use crate::error::DataResult;
use crate::page::Page;
use crate::query::Query;

/// The authoritative, strongly consistent backend.
///
/// All writes go through a `Store`. `model` names the collection
/// (table, bucket, ...) the call addresses.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Run a query; the page carries the total match count.
    async fn find(&self, model: &str, query: &Query) -> DataResult<Page<Document>>;

    /// Single-row lookup: the first match of `query`, if any.
    async fn find_one(&self, model: &str, query: &Query) -> DataResult<Option<Document>> {
        let page = self.find(model, &query.clone().limit(1)).await?;
        Ok(page.content.into_iter().next())
    }

    /// Insert a new entity. An `"id"` field in `fields` is honored, otherwise
    /// the store assigns one.
    async fn insert(&self, model: &str, fields: Map<String, Value>) -> DataResult<Document>;

    /// Merge `patch` into an existing entity.
    async fn update(&self, model: &str, id: &str, patch: &Map<String, Value>) -> DataResult<Document>;

    /// Remove one entity. Returns whether it existed.
    async fn delete(&self, model: &str, id: &str) -> DataResult<bool>;

    /// Merge `patch` into every listed entity. Returns how many were updated.
    async fn bulk_update(&self, model: &str, ids: &[String], patch: &Map<String, Value>) -> DataResult<u64>;

    /// Remove every listed entity. Returns how many were removed.
    async fn bulk_delete(&self, model: &str, ids: &[String]) -> DataResult<u64>;
}

/// Secondary, read-only search backend.
///
/// Kept in sync with the store by an external indexing pipeline, so a
/// just-written entity may not be visible yet.
#[async_trait]
pub trait SearchIndex: Send + Sync + 'static {
    /// Run a query, honoring its free-text terms.
    async fn search(&self, model: &str, query: &Query) -> DataResult<Page<Document>>;
}
