//! Read/write access to the two backends.
//!
//! Reads go to the authoritative store or to the search index depending on
//! the node's [`BackendKind`]; writes always go to the store. An
//! [`Restriction::Empty`] restriction never reaches either backend.

use std::sync::Arc;

use nestr_data::{DataError, Document, Filters, Page, Pageable, Query, SearchIndex, Store};
use serde_json::{Map, Value};
use tracing::debug;

use crate::context::RequestContext;
use crate::error::ViewError;
use crate::node::BackendKind;
use crate::restriction::Restriction;

/// Everything a collection read is narrowed by, besides the restriction.
#[derive(Debug, Clone, Default)]
pub struct CollectionQuery {
    pub filters: Filters,
    pub pageable: Pageable,
    pub sort: Vec<(String, bool)>,
    /// Free-text terms; only the search index honors them.
    pub terms: Vec<String>,
}

impl CollectionQuery {
    pub fn from_context(ctx: &RequestContext) -> Result<Self, ViewError> {
        Ok(Self {
            filters: ctx.filters(),
            pageable: ctx.pageable()?,
            sort: ctx.sort(),
            terms: ctx.terms(),
        })
    }

    fn to_query(&self, restriction: &Restriction, with_terms: bool) -> Query {
        let mut query = Query::new().filters(&self.filters);
        if let Restriction::Ids(ids) = restriction {
            query = query.where_id_in(ids.clone());
        }
        for (field, ascending) in &self.sort {
            query = query.order_by(field, *ascending);
        }
        if with_terms {
            for term in &self.terms {
                query = query.term(term);
            }
        }
        query.paginate(self.pageable)
    }
}

#[derive(Clone)]
pub struct DualBackendAccessor {
    store: Arc<dyn Store>,
    index: Option<Arc<dyn SearchIndex>>,
}

impl DualBackendAccessor {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store, index: None }
    }

    pub fn with_index(mut self, index: Arc<dyn SearchIndex>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    fn index(&self) -> Result<&dyn SearchIndex, ViewError> {
        self.index
            .as_deref()
            .ok_or_else(|| ViewError::Data(DataError::Backend("no search index is configured".into())))
    }

    /// Fetch a page of `model` entities admitted by `restriction`.
    pub async fn get_collection(
        &self,
        kind: BackendKind,
        model: &str,
        restriction: &Restriction,
        params: &CollectionQuery,
    ) -> Result<Page<Document>, ViewError> {
        if restriction.is_empty() {
            debug!(model, "empty restriction, skipping query");
            return Ok(Page::empty(&params.pageable));
        }
        let page = match kind {
            BackendKind::StoreOnly => {
                if !params.terms.is_empty() {
                    debug!(model, "store reads ignore free-text terms");
                }
                let query = params.to_query(restriction, false);
                self.store.find(model, &query).await?
            }
            BackendKind::StoreWithIndexRead => {
                let query = params.to_query(restriction, true);
                debug!(model, raw = ?query.raw_query(), "index collection read");
                self.index()?.search(model, &query).await?
            }
        };
        debug!(model, total = page.total_elements, "collection read");
        Ok(page)
    }

    /// Fetch the single entity whose `id_field` equals `id`, if the
    /// restriction admits it.
    ///
    /// The store is asked to apply the restriction itself; the index path
    /// rejects non-members before issuing any query.
    pub async fn get_item(
        &self,
        kind: BackendKind,
        model: &str,
        id_field: &str,
        restriction: &Restriction,
        id: &str,
    ) -> Result<Document, ViewError> {
        if restriction.is_empty() {
            debug!(model, id, "empty restriction, item cannot exist");
            return Err(ViewError::not_found(model, id));
        }
        let mut query = Query::new().where_eq(id_field, id);
        if let Restriction::Ids(ids) = restriction {
            match kind {
                BackendKind::StoreOnly => query = query.where_id_in(ids.clone()),
                BackendKind::StoreWithIndexRead if !restriction.admits(id) => {
                    debug!(model, id, "id outside restriction");
                    return Err(ViewError::not_found(model, id));
                }
                BackendKind::StoreWithIndexRead => {}
            }
        }
        let found = match kind {
            BackendKind::StoreOnly => self.store.find_one(model, &query).await?,
            BackendKind::StoreWithIndexRead => self
                .index()?
                .search(model, &query.limit(1))
                .await?
                .content
                .into_iter()
                .next(),
        };
        found.ok_or_else(|| ViewError::not_found(model, id))
    }

    pub async fn insert(&self, model: &str, fields: Map<String, Value>) -> Result<Document, ViewError> {
        Ok(self.store.insert(model, fields).await?)
    }

    pub async fn update(&self, model: &str, id: &str, patch: &Map<String, Value>) -> Result<Document, ViewError> {
        Ok(self.store.update(model, id, patch).await?)
    }

    pub async fn delete(&self, model: &str, id: &str) -> Result<bool, ViewError> {
        Ok(self.store.delete(model, id).await?)
    }

    pub async fn bulk_update(&self, model: &str, ids: &[String], patch: &Map<String, Value>) -> Result<u64, ViewError> {
        Ok(self.store.bulk_update(model, ids, patch).await?)
    }

    pub async fn bulk_delete(&self, model: &str, ids: &[String]) -> Result<u64, ViewError> {
        Ok(self.store.bulk_delete(model, ids).await?)
    }
}

#[cfg(test)]
mod tests {
    use nestr_data::{MemoryIndex, MemoryStore};
    use serde_json::json;

    use super::*;

    fn backends() -> (MemoryStore, MemoryIndex, DualBackendAccessor) {
        let store = MemoryStore::new();
        store
            .seed(
                "books",
                [
                    json!({ "id": "b1", "title": "Dune", "year": 1965 }),
                    json!({ "id": "b2", "title": "Dune Messiah", "year": 1969 }),
                    json!({ "id": "b3", "title": "Emma", "year": 1815 }),
                ],
            )
            .unwrap();
        let index = MemoryIndex::new();
        index.sync_from(&store);
        let accessor = DualBackendAccessor::new(Arc::new(store.clone()))
            .with_index(Arc::new(index.clone()));
        (store, index, accessor)
    }

    #[tokio::test]
    async fn empty_restriction_issues_no_query() {
        let (store, index, accessor) = backends();
        for kind in [BackendKind::StoreOnly, BackendKind::StoreWithIndexRead] {
            let page = accessor
                .get_collection(kind, "books", &Restriction::Empty, &CollectionQuery::default())
                .await
                .unwrap();
            assert!(page.content.is_empty());
            assert_eq!(page.total_elements, 0);
            assert!(accessor
                .get_item(kind, "books", "id", &Restriction::Empty, "b1")
                .await
                .is_err());
        }
        assert_eq!(store.query_count(), 0);
        assert_eq!(index.query_count(), 0);
    }

    #[tokio::test]
    async fn restriction_narrows_collection() {
        let (_, _, accessor) = backends();
        let restriction = Restriction::Ids(vec!["b1".into(), "b3".into()]);
        let page = accessor
            .get_collection(BackendKind::StoreOnly, "books", &restriction, &CollectionQuery::default())
            .await
            .unwrap();
        let ids: Vec<_> = page.content.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b3"]);
    }

    #[tokio::test]
    async fn index_honors_terms_store_does_not() {
        let (store, index, accessor) = backends();
        let params = CollectionQuery {
            terms: vec!["messiah".into()],
            ..CollectionQuery::default()
        };
        let from_index = accessor
            .get_collection(BackendKind::StoreWithIndexRead, "books", &Restriction::Unrestricted, &params)
            .await
            .unwrap();
        assert_eq!(from_index.total_elements, 1);
        let from_store = accessor
            .get_collection(BackendKind::StoreOnly, "books", &Restriction::Unrestricted, &params)
            .await
            .unwrap();
        assert_eq!(from_store.total_elements, 3);
        assert_eq!(index.query_count(), 1);
        assert_eq!(store.query_count(), 1);
    }

    #[tokio::test]
    async fn index_item_outside_restriction_is_not_queried() {
        let (_, index, accessor) = backends();
        let restriction = Restriction::Ids(vec!["b1".into()]);
        let err = accessor
            .get_item(BackendKind::StoreWithIndexRead, "books", "id", &restriction, "b2")
            .await
            .unwrap_err();
        assert!(matches!(err, ViewError::NotFound(_)));
        assert_eq!(index.query_count(), 0);

        let doc = accessor
            .get_item(BackendKind::StoreWithIndexRead, "books", "id", &restriction, "b1")
            .await
            .unwrap();
        assert_eq!(doc.id, "b1");
        assert_eq!(index.query_count(), 1);
    }

    #[tokio::test]
    async fn store_item_outside_restriction_is_queried_and_missing() {
        let (store, _, accessor) = backends();
        let restriction = Restriction::Ids(vec!["b1".into()]);
        let err = accessor
            .get_item(BackendKind::StoreOnly, "books", "id", &restriction, "b2")
            .await
            .unwrap_err();
        assert!(matches!(err, ViewError::NotFound(_)));
        assert_eq!(store.query_count(), 1);
    }

    #[tokio::test]
    async fn index_read_without_index_fails() {
        let accessor = DualBackendAccessor::new(Arc::new(MemoryStore::new()));
        let err = accessor
            .get_collection(
                BackendKind::StoreWithIndexRead,
                "books",
                &Restriction::Unrestricted,
                &CollectionQuery::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ViewError::Data(DataError::Backend(_))));
    }
}
