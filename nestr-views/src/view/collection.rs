use nestr_data::{canonical_id, Document, Pageable};
use serde_json::{Map, Value};
use tracing::debug;

use super::RestView;
use crate::accessor::CollectionQuery;
use crate::context::RequestContext;
use crate::error::ViewError;
use crate::node::BackendKind;
use crate::response::ViewResponse;

impl RestView {
    fn item_id<'c>(&self, ctx: &'c RequestContext) -> Result<&'c str, ViewError> {
        let param = &self.node().id_parameter_name;
        ctx.path_param(param)
            .ok_or_else(|| ViewError::bad_request(format!("missing path parameter `{param}`")))
    }

    fn item_location(&self, ctx: &RequestContext, doc: &Document) -> String {
        let node = self.node();
        let id = doc
            .get(node.id_field())
            .as_ref()
            .and_then(canonical_id)
            .unwrap_or_else(|| doc.id.clone());
        self.tree.location(node, ctx.path_params(), Some(&id))
    }

    /// Entity `id` as the store sees it, under the parent's restriction.
    async fn fetch_for_write(&self, ctx: &RequestContext, id: &str) -> Result<Document, ViewError> {
        let node = self.node();
        let restriction = self.write_resolver().resolve_collection(node, ctx).await?;
        self.accessor
            .get_item(BackendKind::StoreOnly, &node.model, node.id_field(), &restriction, id)
            .await
    }

    pub(super) async fn list(&self, kind: BackendKind, ctx: &RequestContext) -> Result<ViewResponse, ViewError> {
        let node = self.node();
        let restriction = self.resolver().resolve_collection(node, ctx).await?;
        let params = CollectionQuery::from_context(ctx)?;
        let page = self
            .accessor
            .get_collection(kind, &node.model, &restriction, &params)
            .await?;
        Ok(ViewResponse::Collection(page))
    }

    pub(super) async fn fetch(&self, kind: BackendKind, ctx: &RequestContext) -> Result<ViewResponse, ViewError> {
        let node = self.node();
        let id = self.item_id(ctx)?;
        let restriction = self.resolver().resolve_collection(node, ctx).await?;
        let doc = self
            .accessor
            .get_item(kind, &node.model, node.id_field(), &restriction, id)
            .await?;
        Ok(ViewResponse::Item(doc.to_value()))
    }

    /// Insert a new entity. Under a parent whose relation is a list, the new
    /// id is appended to that list so the entity shows up in the nested
    /// collection.
    pub(super) async fn insert(&self, ctx: &RequestContext) -> Result<ViewResponse, ViewError> {
        let node = self.node();
        let fields = ctx.payload_fields()?;
        let owner = if node.is_root() {
            None
        } else {
            Some(self.write_resolver().resolve_owner(node, ctx).await?)
        };

        let doc = self.accessor.insert(&node.model, fields).await?;

        if let Some((parent, owner)) = owner {
            if let Some(Value::Array(mut members)) = owner.get(&node.collection_name) {
                members.push(Value::String(doc.id.clone()));
                let mut patch = Map::new();
                patch.insert(node.collection_name.clone(), Value::Array(members));
                self.accessor.update(&parent.model, &owner.id, &patch).await?;
                debug!(resource = %node.key, parent = %owner.id, id = %doc.id, "attached to parent");
            }
        }

        Ok(ViewResponse::Created {
            location: Some(self.item_location(ctx, &doc)),
            resource: doc.to_value(),
        })
    }

    pub(super) async fn mutate(&self, ctx: &RequestContext) -> Result<ViewResponse, ViewError> {
        let node = self.node();
        let fields = ctx.payload_fields()?;
        let current = self.fetch_for_write(ctx, self.item_id(ctx)?).await?;
        let doc = self.accessor.update(&node.model, &current.id, &fields).await?;
        Ok(ViewResponse::Status {
            message: "Updated".to_string(),
            count: None,
            location: Some(self.item_location(ctx, &doc)),
        })
    }

    pub(super) async fn remove(&self, ctx: &RequestContext) -> Result<ViewResponse, ViewError> {
        let node = self.node();
        let current = self.fetch_for_write(ctx, self.item_id(ctx)?).await?;
        self.accessor.delete(&node.model, &current.id).await?;
        Ok(ViewResponse::status("Deleted"))
    }

    /// Bulk update. `_limit` bounds the target set and is never part of the
    /// update payload.
    pub(super) async fn mutate_many(&self, mut ctx: RequestContext) -> Result<ViewResponse, ViewError> {
        let node = self.node();
        let limit = ctx.take_limit()?;
        let restriction = self.write_resolver().resolve_collection(node, &ctx).await?;
        let params = CollectionQuery {
            filters: ctx.filters(),
            pageable: Pageable::new(limit, 0),
            sort: ctx.sort(),
            terms: Vec::new(),
        };
        let targets = self
            .accessor
            .get_collection(BackendKind::StoreOnly, &node.model, &restriction, &params)
            .await?;
        let ids: Vec<String> = targets.content.iter().map(|d| d.id.clone()).collect();
        let patch = ctx.payload_fields()?;
        let updated = if ids.is_empty() {
            0
        } else {
            self.accessor.bulk_update(&node.model, &ids, &patch).await?
        };
        debug!(resource = %node.key, count = updated, "bulk update");
        Ok(ViewResponse::Status {
            message: format!("Updated {updated} {}(s) objects", node.model),
            count: Some(updated),
            location: None,
        })
    }

    /// Bulk delete in two phases: without the confirmation marker the
    /// candidates are returned and nothing is removed.
    pub(super) async fn remove_many(&self, ctx: &RequestContext) -> Result<ViewResponse, ViewError> {
        let node = self.node();
        let restriction = self.write_resolver().resolve_collection(node, ctx).await?;
        let params = CollectionQuery {
            terms: Vec::new(),
            ..CollectionQuery::from_context(ctx)?
        };
        let candidates = self
            .accessor
            .get_collection(BackendKind::StoreOnly, &node.model, &restriction, &params)
            .await?;

        if !ctx.is_confirmed() {
            let count = candidates.content.len() as u64;
            debug!(resource = %node.key, count, "delete pending confirmation");
            return Ok(ViewResponse::PendingConfirmation {
                items: candidates.content,
                count,
                confirmation_key: ctx.confirmation_key().to_string(),
            });
        }

        let ids: Vec<String> = candidates.content.into_iter().map(|d| d.id).collect();
        let removed = if ids.is_empty() {
            0
        } else {
            self.accessor.bulk_delete(&node.model, &ids).await?
        };
        debug!(resource = %node.key, count = removed, "bulk delete");
        Ok(ViewResponse::Status {
            message: format!("Deleted {removed} {}(s) objects", node.model),
            count: Some(removed),
            location: None,
        })
    }
}
