//! In-memory implementation of the remote table gateway, used by tests.
//!
//! Behaves like the REST backend from the services' point of view: rows are
//! JSON objects keyed by an `"id"` string, partial updates merge fields,
//! updates and deletes of missing rows are silent no-ops (the backend answers
//! those with an empty result, not an error).
//!
//! Failures can be scripted per (operation, table, row) to simulate network
//! errors in partial-batch scenarios.

use crate::store::table_store::{FilterOp, ListQuery, TableStore};
use crate::store::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Operation kind used when scripting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Insert,
    Update,
    Delete,
}

/// In-memory table store for tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Value>>>,

    /// One-shot scripted failures: (op, table, row id). A row id of "*"
    /// matches any row. Consumed on first match.
    failures: Mutex<HashSet<(StoreOp, String, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents of a table.
    pub async fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.tables.write().await;
        tables.insert(table.to_string(), rows);
    }

    /// Script a one-shot failure for the next matching call.
    ///
    /// `id = "*"` fails the next call of that kind on the table regardless
    /// of row.
    pub fn fail_next(&self, op: StoreOp, table: &str, id: &str) {
        let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        failures.insert((op, table.to_string(), id.to_string()));
    }

    /// Number of rows currently in a table.
    pub async fn row_count(&self, table: &str) -> usize {
        let tables = self.tables.read().await;
        tables.get(table).map(|rows| rows.len()).unwrap_or(0)
    }

    fn take_failure(&self, op: StoreOp, table: &str, id: &str) -> bool {
        let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        let exact = (op, table.to_string(), id.to_string());
        if failures.remove(&exact) {
            return true;
        }
        let wildcard = (op, table.to_string(), "*".to_string());
        failures.remove(&wildcard)
    }

    fn matches(row: &Value, query: &ListQuery) -> bool {
        query.filters.iter().all(|filter| {
            let field = row.get(&filter.column).unwrap_or(&Value::Null);
            match filter.op {
                FilterOp::Eq => field == &filter.value,
                FilterOp::Neq => field != &filter.value,
                FilterOp::IsNull => field.is_null(),
            }
        })
    }

    fn compare(a: &Value, b: &Value) -> Ordering {
        match (a, b) {
            (Value::Number(x), Value::Number(y)) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            _ => Ordering::Equal,
        }
    }
}

fn row_id(row: &Value) -> &str {
    row.get("id").and_then(Value::as_str).unwrap_or_default()
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn list(&self, table: &str, query: ListQuery) -> Result<Vec<Value>, StoreError> {
        if self.take_failure(StoreOp::List, table, "*") {
            return Err(StoreError::Transport("simulated network error".into()));
        }

        let tables = self.tables.read().await;
        let mut rows: Vec<Value> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| Self::matches(row, &query))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = Self::compare(
                    a.get(&order.column).unwrap_or(&Value::Null),
                    b.get(&order.column).unwrap_or(&Value::Null),
                );
                if order.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }

        if let Some(range) = query.range {
            rows = rows
                .into_iter()
                .skip(range.offset)
                .take(range.limit)
                .collect();
        }

        Ok(rows)
    }

    async fn get(&self, table: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .and_then(|rows| rows.iter().find(|row| row_id(row) == id))
            .cloned())
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
        let mut row = row;
        if row_id(&row).is_empty() {
            if let Some(obj) = row.as_object_mut() {
                obj.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
            }
        }

        if self.take_failure(StoreOp::Insert, table, row_id(&row)) {
            return Err(StoreError::Transport("simulated network error".into()));
        }

        let mut tables = self.tables.write().await;
        tables
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, id: &str, partial: Value) -> Result<(), StoreError> {
        if self.take_failure(StoreOp::Update, table, id) {
            return Err(StoreError::Transport("simulated network error".into()));
        }

        let mut tables = self.tables.write().await;
        if let Some(rows) = tables.get_mut(table) {
            if let Some(row) = rows.iter_mut().find(|row| row_id(row) == id) {
                if let (Some(target), Some(fields)) = (row.as_object_mut(), partial.as_object()) {
                    for (key, value) in fields {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
        if self.take_failure(StoreOp::Delete, table, id) {
            return Err(StoreError::Transport("simulated network error".into()));
        }

        let mut tables = self.tables.write().await;
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|row| row_id(row) != id);
        }
        Ok(())
    }
}
