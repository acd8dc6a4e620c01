//! # nestr-data — document storage abstractions
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Document`] | Schemaless entity: an id plus a JSON field map |
//! | [`Query`] | Backend-neutral filter / sort / pagination description |
//! | [`Page`] | A page of results with the total match count |
//! | [`Store`] | Authoritative read/write backend |
//! | [`SearchIndex`] | Read-only, eventually consistent search backend |
//! | [`MemoryStore`] / [`MemoryIndex`] | In-process implementations with query counters |

pub mod document;
pub mod error;
pub mod memory;
pub mod page;
pub mod query;
pub mod repository;

pub use document::{canonical_id, Document};
pub use error::{DataError, DataResult};
pub use memory::{MemoryIndex, MemoryStore};
pub use page::{Page, Pageable};
pub use query::{FilterValue, Filters, Query};
pub use repository::{SearchIndex, Store};

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        DataError, DataResult, Document, Filters, FilterValue, Page, Pageable, Query, SearchIndex,
        Store,
    };
}
