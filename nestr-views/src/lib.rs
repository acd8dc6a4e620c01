//! # nestr-views — nested REST resources
//!
//! Turns a tree of resource descriptors into REST views whose reads are
//! confined by their ancestors:
//!
//! ```text
//! GET /authors/a1/books        → books listed in author a1's `books` relation
//! GET /authors/a1/books/b3     → 404 unless b3 is one of them
//! DELETE /authors/a1/books     → candidates, then removal once confirmed
//! ```
//!
//! | Type | Role |
//! |------|------|
//! | [`ResourceTree`] / [`ResourceNode`] | Compiled resource descriptors |
//! | [`RequestContext`] | Path parameters, filters, reserved keys, body |
//! | [`NestedQueryResolver`] | Parent-chain restriction |
//! | [`DualBackendAccessor`] | Store / search index reads, store writes |
//! | [`OperationSetGenerator`] / [`RestView`] | Allowed or rejecting operation slots per node |
//! | [`Dispatcher`] | Method tables, routing and the axum router |

pub mod accessor;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod node;
pub mod operation;
pub mod resolver;
pub mod response;
pub mod restriction;
pub mod settings;
pub mod view;

pub use accessor::{CollectionQuery, DualBackendAccessor};
pub use context::RequestContext;
pub use dispatcher::Dispatcher;
pub use error::{TreeError, ViewError};
pub use node::{
    AttributeOptions, BackendKind, NodeId, PathMatch, ResourceDescriptor, ResourceNode,
    ResourceTree, Shape, ValueType,
};
pub use operation::{allowed_operations_from_methods, Operation, Scope};
pub use resolver::NestedQueryResolver;
pub use response::ViewResponse;
pub use restriction::Restriction;
pub use settings::RestSettings;
pub use view::{Handler, OperationSetGenerator, OperationSlot, RestView, ViewSurface};

pub mod prelude {
    //! Re-exports of the most commonly used view types.
    pub use crate::{
        BackendKind, Dispatcher, DualBackendAccessor, Operation, RequestContext,
        ResourceDescriptor, ResourceTree, RestSettings, Shape, ViewError, ViewResponse,
    };
}
