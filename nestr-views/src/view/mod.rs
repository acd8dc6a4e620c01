//! Generated views: one per resource node.
//!
//! [`OperationSetGenerator::generate`] fills all seven operation slots of a
//! [`ViewSurface`]. Slots the node does not allow are kept as
//! [`OperationSlot::Rejected`], so invoking them fails with
//! `MethodNotAllowed` instead of being absent.

mod attribute;
mod collection;
mod singular;

use std::collections::BTreeSet;
use std::sync::Arc;

use nestr_core::http::Method;
use tracing::{debug, warn};

use crate::accessor::DualBackendAccessor;
use crate::context::RequestContext;
use crate::error::ViewError;
use crate::node::{BackendKind, NodeId, ResourceNode, ResourceTree, Shape};
use crate::operation::{Operation, Scope};
use crate::resolver::NestedQueryResolver;
use crate::response::ViewResponse;

/// Shape-specific implementation bound to an operation slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    List(BackendKind),
    Fetch(BackendKind),
    Insert,
    Mutate,
    Remove,
    MutateMany,
    RemoveMany,
    RelatedShow,
    RelatedCreate,
    RelatedUpdate,
    RelatedDelete,
    AttributeShow,
    AttributeAppend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationSlot {
    Allowed(Handler),
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSurface {
    slots: [OperationSlot; 7],
}

impl ViewSurface {
    pub fn slot(&self, op: Operation) -> OperationSlot {
        self.slots[op.position()]
    }

    pub fn is_allowed(&self, op: Operation) -> bool {
        matches!(self.slot(op), OperationSlot::Allowed(_))
    }

    pub fn allowed(&self) -> impl Iterator<Item = Operation> + '_ {
        Operation::ALL.into_iter().filter(|op| self.is_allowed(*op))
    }
}

pub struct OperationSetGenerator;

impl OperationSetGenerator {
    pub fn generate(shape: Shape, allowed: &BTreeSet<Operation>, backend: BackendKind) -> ViewSurface {
        let slots = Operation::ALL.map(|op| {
            if !allowed.contains(&op) {
                return OperationSlot::Rejected;
            }
            match Self::handler(shape, op, backend) {
                Some(handler) => {
                    debug!(operation = %op, ?handler, "operation slot allowed");
                    OperationSlot::Allowed(handler)
                }
                None => {
                    warn!(operation = %op, ?shape, "declared operation is not supported by the resource shape");
                    OperationSlot::Rejected
                }
            }
        });
        ViewSurface { slots }
    }

    fn handler(shape: Shape, op: Operation, backend: BackendKind) -> Option<Handler> {
        let handler = match (shape, op) {
            (Shape::Collection, Operation::Index) => Handler::List(backend),
            (Shape::Collection, Operation::Show) => Handler::Fetch(backend),
            (Shape::Collection, Operation::Create) => Handler::Insert,
            (Shape::Collection, Operation::Update) => Handler::Mutate,
            (Shape::Collection, Operation::Delete) => Handler::Remove,
            (Shape::Collection, Operation::UpdateMany) => Handler::MutateMany,
            (Shape::Collection, Operation::DeleteMany) => Handler::RemoveMany,
            (Shape::Singular, Operation::Show) => Handler::RelatedShow,
            (Shape::Singular, Operation::Create) => Handler::RelatedCreate,
            (Shape::Singular, Operation::Update) => Handler::RelatedUpdate,
            (Shape::Singular, Operation::Delete) => Handler::RelatedDelete,
            (Shape::Attribute, Operation::Index) => Handler::AttributeShow,
            (Shape::Attribute, Operation::Create) => Handler::AttributeAppend,
            _ => return None,
        };
        Some(handler)
    }
}

/// The operations of one resource node, ready to invoke.
pub struct RestView {
    node: NodeId,
    tree: Arc<ResourceTree>,
    accessor: DualBackendAccessor,
    surface: ViewSurface,
}

impl RestView {
    pub fn new(tree: Arc<ResourceTree>, node: NodeId, accessor: DualBackendAccessor) -> Self {
        let n = tree.node(node);
        debug!(resource = %n.key, "generating view");
        let surface = OperationSetGenerator::generate(n.shape, &n.allowed_operations, n.backend_kind);
        Self {
            node,
            tree,
            accessor,
            surface,
        }
    }

    pub fn node(&self) -> &ResourceNode {
        self.tree.node(self.node)
    }

    pub fn surface(&self) -> &ViewSurface {
        &self.surface
    }

    fn resolver(&self) -> NestedQueryResolver<'_> {
        NestedQueryResolver::new(&self.tree, &self.accessor)
    }

    /// Resolver for operations that write: every ancestor comes from the store.
    fn write_resolver(&self) -> NestedQueryResolver<'_> {
        NestedQueryResolver::for_writes(&self.tree, &self.accessor)
    }

    /// Method table a request to this node goes through. Singular resources
    /// have no collection semantics; attributes only have collection ones.
    pub fn effective_scope(&self, scope: Scope) -> Scope {
        match self.node().shape {
            Shape::Collection => scope,
            Shape::Singular => Scope::Item,
            Shape::Attribute => Scope::Collection,
        }
    }

    /// Verbs this view answers in `scope`, for `Allow` headers.
    pub fn allowed_methods(&self, scope: Scope) -> Vec<Method> {
        let scope = self.effective_scope(scope);
        let mut methods: Vec<Method> = self
            .surface
            .allowed()
            .flat_map(|op| scope.methods_for(op))
            .collect();
        methods.dedup();
        methods
    }

    pub async fn invoke(&self, op: Operation, ctx: RequestContext) -> Result<ViewResponse, ViewError> {
        let node = self.node();
        let handler = match self.surface.slot(op) {
            OperationSlot::Allowed(handler) => handler,
            OperationSlot::Rejected => {
                warn!(resource = %node.key, operation = %op, "operation rejected");
                return Err(ViewError::MethodNotAllowed {
                    resource: node.key.clone(),
                    operation: op,
                });
            }
        };
        debug!(resource = %node.key, operation = %op, ?handler, "invoking operation");
        match handler {
            Handler::List(kind) => self.list(kind, &ctx).await,
            Handler::Fetch(kind) => self.fetch(kind, &ctx).await,
            Handler::Insert => self.insert(&ctx).await,
            Handler::Mutate => self.mutate(&ctx).await,
            Handler::Remove => self.remove(&ctx).await,
            Handler::MutateMany => self.mutate_many(ctx).await,
            Handler::RemoveMany => self.remove_many(&ctx).await,
            Handler::RelatedShow => self.related_show(&ctx).await,
            Handler::RelatedCreate => self.related_create(&ctx).await,
            Handler::RelatedUpdate => self.related_update(&ctx).await,
            Handler::RelatedDelete => self.related_delete(&ctx).await,
            Handler::AttributeShow => self.attribute_show(&ctx).await,
            Handler::AttributeAppend => self.attribute_append(&ctx).await,
        }
    }
}
