use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};
use tracing::debug;

use crate::document::{canonical_id, Document, ID_FIELD};
use crate::error::{DataError, DataResult};
use crate::page::Page;
use crate::query::Query;
use crate::repository::{SearchIndex, Store};

/// Documents per model, ordered by id.
type Shelves = DashMap<String, BTreeMap<String, Document>>;

/// In-process [`Store`] backed by `DashMap`.
///
/// Every physical read (`find`, `find_one`) and write bumps a counter so
/// tests can assert how many queries a request issued.
#[derive(Clone, Default)]
pub struct MemoryStore {
    shelves: Arc<Shelves>,
    queries: Arc<AtomicU64>,
    writes: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load documents without counting them as writes.
    pub fn seed(&self, model: &str, docs: impl IntoIterator<Item = Value>) -> DataResult<()> {
        let mut shelf = self.shelves.entry(model.to_string()).or_default();
        for value in docs {
            let doc = Document::from_value(value)?;
            shelf.insert(doc.id.clone(), doc);
        }
        Ok(())
    }

    /// Read a document directly, bypassing the query counter.
    pub fn peek(&self, model: &str, id: &str) -> Option<Document> {
        self.shelves.get(model)?.get(id).cloned()
    }

    /// Number of documents currently stored for `model`.
    pub fn len(&self, model: &str) -> usize {
        self.shelves.get(model).map_or(0, |shelf| shelf.len())
    }

    pub fn is_empty(&self, model: &str) -> bool {
        self.len(model) == 0
    }

    pub fn snapshot(&self, model: &str) -> Vec<Document> {
        self.shelves
            .get(model)
            .map(|shelf| shelf.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn models(&self) -> Vec<String> {
        self.shelves.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Counts writes the store accepted; rejected ones leave it unchanged.
    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find(&self, model: &str, query: &Query) -> DataResult<Page<Document>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let page = match self.shelves.get(model) {
            Some(shelf) => query.run(shelf.values(), false),
            None => Page::empty(query.pageable()),
        };
        debug!(model, total = page.total_elements, "store query");
        Ok(page)
    }

    async fn insert(&self, model: &str, mut fields: Map<String, Value>) -> DataResult<Document> {
        let id = match fields.remove(ID_FIELD) {
            Some(value) => canonical_id(&value)
                .ok_or_else(|| DataError::Invalid(format!("unusable id for {model}: {value}")))?,
            None => uuid::Uuid::new_v4().simple().to_string(),
        };
        let mut shelf = self.shelves.entry(model.to_string()).or_default();
        if shelf.contains_key(&id) {
            return Err(DataError::Conflict(format!("{model}(id={id}) already exists")));
        }
        self.record_write();
        let doc = Document::new(id.clone(), fields);
        shelf.insert(id.clone(), doc.clone());
        debug!(model, %id, "store insert");
        Ok(doc)
    }

    async fn update(&self, model: &str, id: &str, patch: &Map<String, Value>) -> DataResult<Document> {
        let mut shelf = self
            .shelves
            .get_mut(model)
            .ok_or_else(|| DataError::not_found(model, id))?;
        let doc = shelf
            .get_mut(id)
            .ok_or_else(|| DataError::not_found(model, id))?;
        self.record_write();
        doc.apply(patch);
        debug!(model, id, "store update");
        Ok(doc.clone())
    }

    async fn delete(&self, model: &str, id: &str) -> DataResult<bool> {
        self.record_write();
        let removed = self
            .shelves
            .get_mut(model)
            .is_some_and(|mut shelf| shelf.remove(id).is_some());
        debug!(model, id, removed, "store delete");
        Ok(removed)
    }

    async fn bulk_update(&self, model: &str, ids: &[String], patch: &Map<String, Value>) -> DataResult<u64> {
        self.record_write();
        let mut updated = 0;
        if let Some(mut shelf) = self.shelves.get_mut(model) {
            for id in ids {
                if let Some(doc) = shelf.get_mut(id) {
                    doc.apply(patch);
                    updated += 1;
                }
            }
        }
        debug!(model, updated, "store bulk update");
        Ok(updated)
    }

    async fn bulk_delete(&self, model: &str, ids: &[String]) -> DataResult<u64> {
        self.record_write();
        let mut removed = 0;
        if let Some(mut shelf) = self.shelves.get_mut(model) {
            for id in ids {
                if shelf.remove(id).is_some() {
                    removed += 1;
                }
            }
        }
        debug!(model, removed, "store bulk delete");
        Ok(removed)
    }
}

/// In-process [`SearchIndex`].
///
/// Its contents only change through [`MemoryIndex::index`],
/// [`MemoryIndex::remove`] and [`MemoryIndex::sync_from`], which stand in for
/// the external indexing pipeline.
#[derive(Clone, Default)]
pub struct MemoryIndex {
    shelves: Arc<Shelves>,
    queries: Arc<AtomicU64>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self, model: &str, doc: Document) {
        self.shelves
            .entry(model.to_string())
            .or_default()
            .insert(doc.id.clone(), doc);
    }

    pub fn remove(&self, model: &str, id: &str) {
        if let Some(mut shelf) = self.shelves.get_mut(model) {
            shelf.remove(id);
        }
    }

    /// Replace the whole index with the current contents of `store`.
    pub fn sync_from(&self, store: &MemoryStore) {
        self.shelves.clear();
        for model in store.models() {
            for doc in store.snapshot(&model) {
                self.index(&model, doc);
            }
        }
    }

    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchIndex for MemoryIndex {
    async fn search(&self, model: &str, query: &Query) -> DataResult<Page<Document>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let page = match self.shelves.get(model) {
            Some(shelf) => query.run(shelf.values(), true),
            None => Page::empty(query.pageable()),
        };
        debug!(model, raw = ?query.raw_query(), total = page.total_elements, "index query");
        Ok(page)
    }
}
