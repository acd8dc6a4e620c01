use nestr_data::canonical_id;
use nestr_data::document::ID_FIELD;
use serde_json::{Map, Value};

use super::RestView;
use crate::context::RequestContext;
use crate::error::ViewError;
use crate::response::ViewResponse;
use crate::restriction::Restriction;

impl RestView {
    fn singular_location(&self, ctx: &RequestContext) -> String {
        self.tree.location(self.node(), ctx.path_params(), None)
    }

    /// The related entity, or `null` when the relation is not set. An
    /// embedded object is returned as stored.
    pub(super) async fn related_show(&self, ctx: &RequestContext) -> Result<ViewResponse, ViewError> {
        let node = self.node();
        let (_, owner) = self.resolver().resolve_owner(node, ctx).await?;
        let related = match owner.get(&node.name) {
            None => Value::Null,
            Some(embedded @ Value::Object(_)) => embedded,
            Some(reference) => {
                let id = canonical_id(&reference).ok_or_else(|| {
                    ViewError::bad_request(format!("`{}` does not hold an entity reference", node.name))
                })?;
                self.accessor
                    .get_item(node.backend_kind, &node.model, "id", &Restriction::Unrestricted, &id)
                    .await?
                    .to_value()
            }
        };
        Ok(ViewResponse::Item(related))
    }

    pub(super) async fn related_create(&self, ctx: &RequestContext) -> Result<ViewResponse, ViewError> {
        let node = self.node();
        let fields = ctx.payload_fields()?;
        let (parent, owner) = self.write_resolver().resolve_owner(node, ctx).await?;
        let related = self.accessor.insert(&node.model, fields).await?;

        let mut patch = Map::new();
        patch.insert(node.name.clone(), Value::String(related.id.clone()));
        self.accessor.update(&parent.model, &owner.id, &patch).await?;

        Ok(ViewResponse::Created {
            location: Some(self.singular_location(ctx)),
            resource: related.to_value(),
        })
    }

    /// Mutate the related entity itself; the parent's relation is left as is.
    pub(super) async fn related_update(&self, ctx: &RequestContext) -> Result<ViewResponse, ViewError> {
        let node = self.node();
        let fields = ctx.payload_fields()?;
        let (parent, owner) = self.write_resolver().resolve_owner(node, ctx).await?;
        let relation = owner.get(&node.name).ok_or_else(|| {
            ViewError::NotFound(format!(
                "{}(id={}) has no {}",
                parent.model, owner.id, node.name
            ))
        })?;

        match relation {
            Value::Object(mut embedded) if !embedded.contains_key(ID_FIELD) => {
                embedded.extend(fields);
                let mut patch = Map::new();
                patch.insert(node.name.clone(), Value::Object(embedded));
                self.accessor.update(&parent.model, &owner.id, &patch).await?;
            }
            reference => {
                let id = canonical_id(&reference).ok_or_else(|| {
                    ViewError::bad_request(format!("`{}` does not hold an entity reference", node.name))
                })?;
                self.accessor.update(&node.model, &id, &fields).await?;
            }
        }

        Ok(ViewResponse::Status {
            message: "Updated".to_string(),
            count: None,
            location: Some(self.singular_location(ctx)),
        })
    }

    /// Clear the parent's relation. The related entity itself is kept.
    pub(super) async fn related_delete(&self, ctx: &RequestContext) -> Result<ViewResponse, ViewError> {
        let node = self.node();
        let (parent, owner) = self.write_resolver().resolve_owner(node, ctx).await?;
        let mut patch = Map::new();
        patch.insert(node.name.clone(), Value::Null);
        self.accessor.update(&parent.model, &owner.id, &patch).await?;
        Ok(ViewResponse::status("Deleted"))
    }
}
