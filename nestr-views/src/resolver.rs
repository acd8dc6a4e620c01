use futures_util::future::BoxFuture;
use nestr_data::Document;
use tracing::debug;

use crate::accessor::DualBackendAccessor;
use crate::context::RequestContext;
use crate::error::ViewError;
use crate::node::{BackendKind, ResourceNode, ResourceTree};
use crate::restriction::Restriction;

/// Computes, for a node at any depth, the id set its request is confined to.
///
/// Each level fetches the parent entity under the parent's own restriction
/// and reads the relation attribute named by the child's `collection_name`.
/// A missing ancestor fails the whole request with `NotFound`.
///
/// A reading resolver fetches every ancestor through that ancestor's own
/// backend. A writing resolver ([`for_writes`](Self::for_writes)) fetches
/// every level from the store, so writes never start from index documents.
pub struct NestedQueryResolver<'a> {
    tree: &'a ResourceTree,
    accessor: &'a DualBackendAccessor,
    store_only: bool,
}

impl<'a> NestedQueryResolver<'a> {
    pub fn new(tree: &'a ResourceTree, accessor: &'a DualBackendAccessor) -> Self {
        Self {
            tree,
            accessor,
            store_only: false,
        }
    }

    pub fn for_writes(tree: &'a ResourceTree, accessor: &'a DualBackendAccessor) -> Self {
        Self {
            store_only: true,
            ..Self::new(tree, accessor)
        }
    }

    fn backend_for(&self, node: &ResourceNode) -> BackendKind {
        if self.store_only {
            BackendKind::StoreOnly
        } else {
            node.backend_kind
        }
    }

    pub async fn resolve_collection(
        &self,
        node: &ResourceNode,
        ctx: &RequestContext,
    ) -> Result<Restriction, ViewError> {
        let Some(parent) = self.tree.parent(node) else {
            return Ok(Restriction::Unrestricted);
        };
        let (parent, owner) = self.resolve_parent(node, parent, ctx).await?;
        let restriction = Restriction::from_relation(owner.get(&node.collection_name).as_ref());
        debug!(
            resource = %node.key,
            parent = %parent.key,
            parent_id = %owner.id,
            restriction = ?restriction,
            "resolved restriction"
        );
        Ok(restriction)
    }

    /// Fetch entity `id` of `node`, restricted by every ancestor.
    pub fn resolve_item<'b>(
        &'b self,
        node: &'b ResourceNode,
        ctx: &'b RequestContext,
        id: &'b str,
    ) -> BoxFuture<'b, Result<Document, ViewError>> {
        Box::pin(async move {
            let restriction = self.resolve_collection(node, ctx).await?;
            self.accessor
                .get_item(self.backend_for(node), &node.model, node.id_field(), &restriction, id)
                .await
        })
    }

    /// The parent entity that a singular or attribute node lives on.
    pub async fn resolve_owner(
        &self,
        node: &ResourceNode,
        ctx: &RequestContext,
    ) -> Result<(&'a ResourceNode, Document), ViewError> {
        let parent = self.tree.parent(node).ok_or_else(|| {
            ViewError::bad_request(format!("resource `{}` has no parent entity", node.key))
        })?;
        self.resolve_parent(node, parent, ctx).await
    }

    async fn resolve_parent(
        &self,
        node: &ResourceNode,
        parent: &'a ResourceNode,
        ctx: &RequestContext,
    ) -> Result<(&'a ResourceNode, Document), ViewError> {
        let parent_id = ctx.path_param(&parent.id_parameter_name).ok_or_else(|| {
            ViewError::bad_request(format!(
                "missing path parameter `{}` for {}",
                parent.id_parameter_name, node.key
            ))
        })?;
        let derived = ctx.scoped_to(
            self.tree
                .ancestors(node)
                .into_iter()
                .map(|a| a.id_parameter_name.as_str()),
        );
        let owner = self.resolve_item(parent, &derived, parent_id).await?;
        Ok((parent, owner))
    }
}
