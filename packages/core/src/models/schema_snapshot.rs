//! Schema snapshots for drift detection.
//!
//! A snapshot is the recorded structure of the backend database (tables and
//! columns) at a point in time. Drift detection compares an expected snapshot
//! against the structure actually observed at check time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name
    pub name: String,

    /// Backend data type (e.g. "text", "bigint", "timestamptz")
    pub data_type: String,

    /// Whether the column accepts NULL
    pub nullable: bool,

    /// Column default expression, if any
    pub default: Option<String>,
}

/// One table with its columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name
    pub name: String,

    /// Columns in declaration order
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Find a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A point-in-time structure snapshot of the backend database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    /// When the snapshot was captured
    pub captured_at: DateTime<Utc>,

    /// Tables in the snapshot
    pub tables: Vec<TableSchema>,
}

impl SchemaSnapshot {
    /// Create a snapshot of the given tables, captured now.
    pub fn new(tables: Vec<TableSchema>) -> Self {
        Self {
            captured_at: Utc::now(),
            tables,
        }
    }

    /// Find a table by name.
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Stable hex checksum over the structural content of the snapshot.
    ///
    /// Tables and columns are hashed sorted by name, so two snapshots with
    /// the same structure produce the same checksum regardless of the order
    /// they were captured in. `captured_at` does not participate.
    pub fn checksum(&self) -> String {
        let mut tables: Vec<&TableSchema> = self.tables.iter().collect();
        tables.sort_by(|a, b| a.name.cmp(&b.name));

        let mut hasher = Sha256::new();
        for table in tables {
            hasher.update(table.name.as_bytes());
            hasher.update([0]);

            let mut columns: Vec<&ColumnSchema> = table.columns.iter().collect();
            columns.sort_by(|a, b| a.name.cmp(&b.name));
            for column in columns {
                hasher.update(column.name.as_bytes());
                hasher.update([0]);
                hasher.update(column.data_type.as_bytes());
                hasher.update([0]);
                hasher.update([column.nullable as u8]);
                // Presence byte keeps a missing default distinct from an
                // empty-string default.
                match &column.default {
                    Some(default) => {
                        hasher.update([1]);
                        hasher.update(default.as_bytes());
                    }
                    None => hasher.update([0]),
                }
                hasher.update([0]);
            }
        }

        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, data_type: &str, nullable: bool) -> ColumnSchema {
        ColumnSchema {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable,
            default: None,
        }
    }

    #[test]
    fn test_checksum_ignores_capture_order() {
        let a = SchemaSnapshot::new(vec![
            TableSchema {
                name: "orders".to_string(),
                columns: vec![column("id", "text", false), column("note", "text", true)],
            },
            TableSchema {
                name: "clients".to_string(),
                columns: vec![column("id", "text", false)],
            },
        ]);

        let b = SchemaSnapshot::new(vec![
            TableSchema {
                name: "clients".to_string(),
                columns: vec![column("id", "text", false)],
            },
            TableSchema {
                name: "orders".to_string(),
                columns: vec![column("note", "text", true), column("id", "text", false)],
            },
        ]);

        assert_eq!(a.checksum(), b.checksum());
    }

    #[test]
    fn test_checksum_changes_with_structure() {
        let base = SchemaSnapshot::new(vec![TableSchema {
            name: "orders".to_string(),
            columns: vec![column("id", "text", false)],
        }]);

        let widened = SchemaSnapshot::new(vec![TableSchema {
            name: "orders".to_string(),
            columns: vec![column("id", "text", false), column("note", "text", true)],
        }]);

        assert_ne!(base.checksum(), widened.checksum());
    }

    #[test]
    fn test_checksum_distinguishes_missing_default_from_empty() {
        let with_empty_default = SchemaSnapshot::new(vec![TableSchema {
            name: "orders".to_string(),
            columns: vec![ColumnSchema {
                name: "note".to_string(),
                data_type: "text".to_string(),
                nullable: true,
                default: Some(String::new()),
            }],
        }]);

        let without_default = SchemaSnapshot::new(vec![TableSchema {
            name: "orders".to_string(),
            columns: vec![column("note", "text", true)],
        }]);

        assert_ne!(with_empty_default.checksum(), without_default.checksum());
    }

    #[test]
    fn test_table_and_column_lookup() {
        let snapshot = SchemaSnapshot::new(vec![TableSchema {
            name: "orders".to_string(),
            columns: vec![column("id", "text", false)],
        }]);

        assert!(snapshot.table("orders").is_some());
        assert!(snapshot.table("missing").is_none());
        assert!(snapshot.table("orders").unwrap().column("id").is_some());
    }
}
