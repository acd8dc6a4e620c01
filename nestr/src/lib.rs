//! nestr — nested REST resources over a store and a search index.
//!
//! This facade re-exports the nestr sub-crates through a single dependency:
//!
//! ```ignore
//! use nestr::prelude::*;
//!
//! let config = NestrConfig::load("dev")?;
//! let accessor = DualBackendAccessor::new(Arc::new(MemoryStore::new()));
//! let app = Dispatcher::from_config(&config, accessor)?.into_router();
//! ```
//!
//! | Feature | Default | Crate        |
//! |---------|---------|--------------|
//! | `test`  | no      | `nestr-test` |

pub extern crate nestr_core;

pub use nestr_core::*;

pub use nestr_data;
pub use nestr_views;

#[cfg(feature = "test")]
pub use nestr_test;

pub mod prelude {
    //! Everything needed to describe resources, wire backends and serve them.
    pub use nestr_core::prelude::*;
    pub use nestr_core::{default_trace, init_tracing};
    pub use nestr_data::prelude::*;
    pub use nestr_data::{MemoryIndex, MemoryStore};
    pub use nestr_views::prelude::*;
}
