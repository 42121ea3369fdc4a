//! Attribute Service Integration Tests
//!
//! Covers the variation attribute feature end to end:
//! - Attribute tree building over the in-memory gateway
//! - Option CRUD scoped to an owning attribute
//! - Attribute deletion removes options first and aborts (attribute kept)
//!   when some option deletions fail
//! - Form autosave snapshots persisted through the local state store and
//!   surviving a reopen

#[cfg(test)]
mod attribute_service_tests {
    use serde_json::json;
    use std::sync::Arc;
    use storefront_core::services::{
        AttributeService, NotificationCenter, ServiceError, ATTRIBUTE_TABLE, OPTION_TABLE,
        VARIATION_DRAFT_KEY,
    };
    use storefront_core::store::{LocalStateStore, MemoryStore, StoreOp};
    use tempfile::TempDir;

    fn harness() -> (AttributeService, Arc<MemoryStore>, Arc<LocalStateStore>, TempDir) {
        let dir = TempDir::new().unwrap();
        let local_state = Arc::new(LocalStateStore::open(dir.path().join("state.json")));
        let notifications = Arc::new(NotificationCenter::new(local_state.clone()));
        let store = Arc::new(MemoryStore::new());
        let service = AttributeService::new(store.clone(), notifications, local_state.clone());
        (service, store, local_state, dir)
    }

    fn attribute_row(id: &str, name: &str, parent_id: Option<&str>, sort_order: i64) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "parent_id": parent_id,
            "sort_order": sort_order,
            "created_at": "2026-01-01T00:00:00Z",
            "modified_at": "2026-01-01T00:00:00Z",
        })
    }

    fn option_row(id: &str, attribute_id: &str, value: &str, sort_order: i64) -> serde_json::Value {
        json!({
            "id": id,
            "attribute_id": attribute_id,
            "value": value,
            "sort_order": sort_order,
            "created_at": "2026-01-01T00:00:00Z",
            "modified_at": "2026-01-01T00:00:00Z",
        })
    }

    #[tokio::test]
    async fn test_attribute_tree_nests_children_under_parents() {
        let (service, store, _state, _dir) = harness();
        store
            .seed(
                ATTRIBUTE_TABLE,
                vec![
                    attribute_row("size", "Size", None, 1),
                    attribute_row("shoe-size", "Shoe Size", Some("size"), 1),
                ],
            )
            .await;

        let tree = service.attribute_tree().await.unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].record.id, "size");
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].record.id, "shoe-size");
        assert_eq!(tree[0].children[0].level, 1);
    }

    #[tokio::test]
    async fn test_options_are_scoped_to_their_attribute() {
        let (service, store, _state, _dir) = harness();
        store
            .seed(ATTRIBUTE_TABLE, vec![attribute_row("size", "Size", None, 1)])
            .await;
        store
            .seed(
                OPTION_TABLE,
                vec![
                    option_row("opt-m", "size", "M", 2),
                    option_row("opt-s", "size", "S", 1),
                    option_row("opt-red", "color", "Red", 1),
                ],
            )
            .await;

        let options = service.options_for("size").await.unwrap();

        let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["S", "M"]);
    }

    #[tokio::test]
    async fn test_create_option_requires_existing_attribute() {
        let (service, _store, _state, _dir) = harness();

        let result = service.create_option("ghost", "XL", 1).await;

        assert!(matches!(result, Err(ServiceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_attribute_removes_its_options() {
        let (service, store, _state, _dir) = harness();
        store
            .seed(ATTRIBUTE_TABLE, vec![attribute_row("size", "Size", None, 1)])
            .await;
        store
            .seed(
                OPTION_TABLE,
                vec![
                    option_row("opt-s", "size", "S", 1),
                    option_row("opt-m", "size", "M", 2),
                ],
            )
            .await;

        service.delete_attribute("size").await.unwrap();

        assert_eq!(store.row_count(ATTRIBUTE_TABLE).await, 0);
        assert_eq!(store.row_count(OPTION_TABLE).await, 0);
    }

    #[tokio::test]
    async fn test_delete_attribute_aborts_when_an_option_delete_fails() {
        let (service, store, _state, _dir) = harness();
        store
            .seed(ATTRIBUTE_TABLE, vec![attribute_row("size", "Size", None, 1)])
            .await;
        store
            .seed(
                OPTION_TABLE,
                vec![
                    option_row("opt-s", "size", "S", 1),
                    option_row("opt-m", "size", "M", 2),
                ],
            )
            .await;
        store.fail_next(StoreOp::Delete, OPTION_TABLE, "opt-m");

        let result = service.delete_attribute("size").await;

        assert!(matches!(
            result,
            Err(ServiceError::PartialFailure { succeeded: 1, .. })
        ));
        // The attribute survives so the caller can retry.
        assert_eq!(store.row_count(ATTRIBUTE_TABLE).await, 1);
        assert_eq!(store.row_count(OPTION_TABLE).await, 1);
    }

    #[tokio::test]
    async fn test_reorder_options_partial_failure_reports_the_failed_id() {
        let (service, store, _state, _dir) = harness();
        store
            .seed(ATTRIBUTE_TABLE, vec![attribute_row("size", "Size", None, 1)])
            .await;
        store
            .seed(
                OPTION_TABLE,
                vec![
                    option_row("opt-s", "size", "S", 1),
                    option_row("opt-m", "size", "M", 2),
                    option_row("opt-l", "size", "L", 3),
                ],
            )
            .await;
        store.fail_next(StoreOp::Update, OPTION_TABLE, "opt-m");

        let moves = vec![
            ("opt-s".to_string(), 3),
            ("opt-m".to_string(), 2),
            ("opt-l".to_string(), 1),
        ];
        let result = service.reorder_options("size", &moves).await;

        match result {
            Err(ServiceError::PartialFailure {
                succeeded,
                failures,
            }) => {
                assert_eq!(succeeded, 2);
                assert_eq!(failures[0].id, "opt-m");
            }
            other => panic!("expected partial failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_draft_survives_reopen_and_is_clearable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let draft = json!({"name": "Fabric", "options": ["Cotton", "Linen"]});

        {
            let local_state = Arc::new(LocalStateStore::open(&path));
            let notifications = Arc::new(NotificationCenter::new(local_state.clone()));
            let service =
                AttributeService::new(Arc::new(MemoryStore::new()), notifications, local_state);
            service.save_draft(&draft).unwrap();
        }

        // Fresh store, same file: the snapshot is restorable.
        let local_state = Arc::new(LocalStateStore::open(&path));
        assert_eq!(local_state.get(VARIATION_DRAFT_KEY), Some(draft.clone()));

        let notifications = Arc::new(NotificationCenter::new(local_state.clone()));
        let service =
            AttributeService::new(Arc::new(MemoryStore::new()), notifications, local_state);
        assert_eq!(service.load_draft(), Some(draft));

        service.clear_draft().unwrap();
        assert_eq!(service.load_draft(), None);
    }
}
