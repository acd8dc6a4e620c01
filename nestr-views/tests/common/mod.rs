#![allow(dead_code)]

use std::sync::Arc;

use nestr_data::{MemoryIndex, MemoryStore};
use nestr_views::{
    BackendKind, Dispatcher, DualBackendAccessor, Operation, ResourceDescriptor, ResourceTree,
    RestSettings,
};
use serde_json::json;

pub struct Library {
    pub store: MemoryStore,
    pub index: MemoryIndex,
    pub dispatcher: Dispatcher,
}

impl Library {
    /// Physical queries issued so far, store and index combined.
    pub fn queries(&self) -> (u64, u64) {
        (self.store.query_count(), self.index.query_count())
    }
}

pub fn seed(store: &MemoryStore) {
    store
        .seed(
            "authors",
            [
                json!({ "id": "a1", "name": "Frank", "books": ["b1", "b2"], "tags": ["x"], "profile": "p1" }),
                json!({ "id": "a2", "name": "Jane", "books": [] }),
                json!({ "id": "a3", "name": "Ursula" }),
            ],
        )
        .unwrap();
    store
        .seed(
            "books",
            [
                json!({ "id": "b1", "title": "Dune", "year": 1965, "chapters": ["c1"] }),
                json!({ "id": "b2", "title": "Dune Messiah", "year": 1969 }),
                json!({ "id": "b3", "title": "Emma", "year": 1815, "chapters": ["c2"] }),
            ],
        )
        .unwrap();
    store
        .seed(
            "chapters",
            [
                json!({ "id": "c1", "title": "Arrakis" }),
                json!({ "id": "c2", "title": "Highbury" }),
            ],
        )
        .unwrap();
    store
        .seed("profiles", [json!({ "id": "p1", "bio": "Writes about sand" })])
        .unwrap();
}

/// `authors → books → chapters`, plus `profile` (singular) and `tags`
/// (attribute) on authors.
pub fn descriptors(books_backend: BackendKind, book_ops: Option<Vec<Operation>>) -> Vec<ResourceDescriptor> {
    let mut books = ResourceDescriptor::collection("books")
        .backend(books_backend)
        .child(ResourceDescriptor::collection("chapters"));
    if let Some(ops) = book_ops {
        books = books.operations(ops);
    }
    vec![ResourceDescriptor::collection("authors")
        .child(books)
        .child(ResourceDescriptor::singular("profile").model("profiles"))
        .child(ResourceDescriptor::attribute("tags"))]
}

pub fn library_with(books_backend: BackendKind, book_ops: Option<Vec<Operation>>) -> Library {
    let store = MemoryStore::new();
    seed(&store);
    let index = MemoryIndex::new();
    index.sync_from(&store);
    let accessor = DualBackendAccessor::new(Arc::new(store.clone()))
        .with_index(Arc::new(index.clone()));
    let tree = ResourceTree::build(descriptors(books_backend, book_ops), 8).unwrap();
    let dispatcher = Dispatcher::new(tree, accessor, RestSettings::default()).unwrap();
    Library {
        store,
        index,
        dispatcher,
    }
}

pub fn library() -> Library {
    library_with(BackendKind::StoreOnly, None)
}
