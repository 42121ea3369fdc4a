//! Schema Drift Detection Integration Tests
//!
//! Covers snapshot comparison at the service boundary:
//! - Matching structures raise no notification
//! - Drift is announced at the severity of the worst change
//! - Snapshot checksums are stable across table order and capture time

#[cfg(test)]
mod schema_drift_tests {
    use std::sync::Arc;
    use storefront_core::models::{ColumnSchema, SchemaSnapshot, TableSchema};
    use storefront_core::services::{DriftSeverity, MigrationService, NotificationCenter, Severity};
    use storefront_core::store::LocalStateStore;
    use tempfile::TempDir;

    fn service() -> (MigrationService, Arc<NotificationCenter>, TempDir) {
        let dir = TempDir::new().unwrap();
        let local_state = Arc::new(LocalStateStore::open(dir.path().join("state.json")));
        let notifications = Arc::new(NotificationCenter::new(local_state));
        (
            MigrationService::new(Vec::new(), notifications.clone()),
            notifications,
            dir,
        )
    }

    fn column(name: &str, data_type: &str, nullable: bool) -> ColumnSchema {
        ColumnSchema {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable,
            default: None,
        }
    }

    fn orders_table() -> TableSchema {
        TableSchema {
            name: "orders".to_string(),
            columns: vec![
                column("id", "text", false),
                column("status", "text", false),
                column("total_cents", "bigint", false),
            ],
        }
    }

    fn clients_table() -> TableSchema {
        TableSchema {
            name: "clients".to_string(),
            columns: vec![column("id", "text", false), column("name", "text", false)],
        }
    }

    #[tokio::test]
    async fn test_matching_schema_raises_no_notification() {
        let (service, notifications, _dir) = service();
        let mut receiver = notifications.subscribe();

        let expected = SchemaSnapshot::new(vec![orders_table(), clients_table()]);
        let observed = SchemaSnapshot::new(vec![orders_table(), clients_table()]);

        let diff = service.check_drift(&expected, &observed);

        assert!(diff.is_empty());
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_critical_drift_is_announced_as_an_error() {
        let (service, notifications, _dir) = service();
        let mut receiver = notifications.subscribe();

        let expected = SchemaSnapshot::new(vec![orders_table(), clients_table()]);
        // The clients table vanished and an orders column changed type.
        let observed = SchemaSnapshot::new(vec![TableSchema {
            name: "orders".to_string(),
            columns: vec![
                column("id", "text", false),
                column("status", "text", false),
                column("total_cents", "numeric", false),
            ],
        }]);

        let diff = service.check_drift(&expected, &observed);

        assert_eq!(diff.max_severity(), Some(DriftSeverity::Critical));
        let notification = receiver.recv().await.unwrap();
        assert_eq!(notification.severity, Severity::Error);
        assert_eq!(notification.title, "Schema drift detected");
    }

    #[tokio::test]
    async fn test_additive_drift_is_announced_as_info() {
        let (service, notifications, _dir) = service();
        let mut receiver = notifications.subscribe();

        let expected = SchemaSnapshot::new(vec![orders_table()]);
        let observed = SchemaSnapshot::new(vec![orders_table(), clients_table()]);

        let diff = service.check_drift(&expected, &observed);

        assert_eq!(diff.max_severity(), Some(DriftSeverity::Info));
        assert_eq!(receiver.recv().await.unwrap().severity, Severity::Info);
    }

    #[test]
    fn test_checksum_ignores_table_order_and_capture_time() {
        let first = SchemaSnapshot::new(vec![orders_table(), clients_table()]);
        let second = SchemaSnapshot::new(vec![clients_table(), orders_table()]);

        assert_eq!(first.checksum(), second.checksum());
    }

    #[test]
    fn test_checksum_changes_when_structure_changes() {
        let base = SchemaSnapshot::new(vec![orders_table()]);

        let mut widened = orders_table();
        widened.columns.push(column("note", "text", true));
        let changed = SchemaSnapshot::new(vec![widened]);

        assert_ne!(base.checksum(), changed.checksum());
    }
}
