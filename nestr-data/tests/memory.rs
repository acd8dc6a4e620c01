use nestr_data::{DataError, MemoryIndex, MemoryStore, Pageable, Query, SearchIndex, Store};
use serde_json::{json, Map, Value};

fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .seed(
            "books",
            vec![
                json!({"id": "b1", "title": "Dune", "status": "draft"}),
                json!({"id": "b2", "title": "Emma", "status": "published"}),
                json!({"id": "b3", "title": "Ubik", "status": "draft"}),
            ],
        )
        .unwrap();
    store
}

#[tokio::test]
async fn find_counts_queries_and_totals() {
    let store = seeded_store();
    let page = store
        .find("books", &Query::new().where_eq("status", "draft"))
        .await
        .unwrap();
    assert_eq!(page.total_elements, 2);
    assert_eq!(store.query_count(), 1);
}

#[tokio::test]
async fn find_on_unknown_model_is_empty() {
    let store = MemoryStore::new();
    let page = store
        .find("ghosts", &Query::new().paginate(Pageable::new(Some(20), 0)))
        .await
        .unwrap();
    assert!(page.content.is_empty());
    assert_eq!(page.size, Some(20));
}

#[tokio::test]
async fn find_one_respects_filters() {
    let store = seeded_store();
    let hit = store
        .find_one(
            "books",
            &Query::new()
                .where_eq("id", "b2")
                .where_id_in(vec!["b1".into(), "b2".into()]),
        )
        .await
        .unwrap();
    assert_eq!(hit.map(|d| d.id), Some("b2".to_string()));

    let miss = store
        .find_one(
            "books",
            &Query::new().where_eq("id", "b3").where_id_in(vec!["b1".into()]),
        )
        .await
        .unwrap();
    assert!(miss.is_none());
}

#[tokio::test]
async fn insert_assigns_or_honors_ids() {
    let store = MemoryStore::new();
    let given = store
        .insert("books", object(json!({"id": 42, "title": "Solaris"})))
        .await
        .unwrap();
    assert_eq!(given.id, "42");

    let generated = store
        .insert("books", object(json!({"title": "Roadside Picnic"})))
        .await
        .unwrap();
    assert_eq!(generated.id.len(), 32);
    assert_eq!(store.len("books"), 2);
    assert_eq!(store.write_count(), 2);
}

#[tokio::test]
async fn insert_rejects_duplicate_id() {
    let store = seeded_store();
    let err = store
        .insert("books", object(json!({"id": "b1"})))
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Conflict(_)));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn update_missing_entity_is_not_found() {
    let store = seeded_store();
    let err = store
        .update("books", "nope", &object(json!({"title": "x"})))
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::NotFound(_)));
}

#[tokio::test]
async fn bulk_operations_report_counts() {
    let store = seeded_store();
    let ids = vec!["b1".to_string(), "b3".to_string(), "missing".to_string()];
    let updated = store
        .bulk_update("books", &ids, &object(json!({"status": "published"})))
        .await
        .unwrap();
    assert_eq!(updated, 2);
    assert_eq!(
        store.peek("books", "b3").unwrap().get("status"),
        Some(json!("published"))
    );

    let removed = store.bulk_delete("books", &ids).await.unwrap();
    assert_eq!(removed, 2);
    assert_eq!(store.len("books"), 1);
}

#[tokio::test]
async fn index_lags_until_synced() {
    let store = seeded_store();
    let index = MemoryIndex::new();
    index.sync_from(&store);

    store
        .insert("books", object(json!({"id": "b4", "title": "Fresh"})))
        .await
        .unwrap();

    let before = index.search("books", &Query::new()).await.unwrap();
    assert_eq!(before.total_elements, 3);

    index.sync_from(&store);
    let after = index.search("books", &Query::new()).await.unwrap();
    assert_eq!(after.total_elements, 4);
    assert_eq!(index.query_count(), 2);
}

#[tokio::test]
async fn index_honors_free_text_but_store_does_not() {
    let store = seeded_store();
    let index = MemoryIndex::new();
    index.sync_from(&store);

    let query = Query::new().term("dune");
    assert_eq!(index.search("books", &query).await.unwrap().total_elements, 1);
    assert_eq!(store.find("books", &query).await.unwrap().total_elements, 3);
}
