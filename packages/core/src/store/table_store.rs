//! TableStore Trait - Remote Table Gateway Abstraction
//!
//! Defines the `TableStore` trait that abstracts select/insert/update/delete
//! against named remote tables. The trait enables two implementations without
//! changing business logic in the services: `RestStore` (the hosted backend)
//! and `MemoryStore` (tests).
//!
//! # Design
//!
//! - **Rows are JSON**: tables carry `serde_json::Value` objects; the typed
//!   wrapper [`TypedTable`] converts at the edge so services work with
//!   domain structs.
//! - **Single-shot**: no retry. Failures surface the backend's message
//!   unmodified as [`StoreError`].
//! - **Async-first**: all methods are async; implementations must be
//!   `Send + Sync`.

use crate::store::StoreError;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Comparison operator of a list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Column equals value
    Eq,
    /// Column does not equal value
    Neq,
    /// Column is NULL (value ignored)
    IsNull,
}

/// One column filter of a list query.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    /// Column equals value.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Eq,
            value: value.into(),
        }
    }

    /// Column does not equal value.
    pub fn neq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Neq,
            value: value.into(),
        }
    }

    /// Column is NULL.
    pub fn is_null(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::IsNull,
            value: Value::Null,
        }
    }
}

/// Sort column and direction of a list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// Pagination window of a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub offset: usize,
    pub limit: usize,
}

/// Filter/order/pagination parameters for [`TableStore::list`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub order: Option<OrderBy>,
    pub range: Option<Range>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, order: OrderBy) -> Self {
        self.order = Some(order);
        self
    }

    pub fn range(mut self, offset: usize, limit: usize) -> Self {
        self.range = Some(Range { offset, limit });
        self
    }
}

/// Abstraction over select/insert/update/delete against named remote tables.
///
/// All calls are single-shot and asynchronous. Rows are JSON objects carrying
/// an `"id"` string field.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// List rows matching the query.
    async fn list(&self, table: &str, query: ListQuery) -> Result<Vec<Value>, StoreError>;

    /// Get a single row by id. `Ok(None)` when the row does not exist.
    async fn get(&self, table: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Insert a row and return it as stored by the backend.
    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError>;

    /// Apply a partial update to the row with the given id.
    async fn update(&self, table: &str, id: &str, partial: Value) -> Result<(), StoreError>;

    /// Delete the row with the given id.
    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError>;
}

/// Typed view over one table of a [`TableStore`].
///
/// Converts between domain structs and JSON rows at the gateway edge so the
/// services never touch raw `Value`s.
pub struct TypedTable<T> {
    store: Arc<dyn TableStore>,
    table: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedTable<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn TableStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
            _marker: PhantomData,
        }
    }

    /// Table name this view reads and writes.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub async fn list(&self, query: ListQuery) -> Result<Vec<T>, StoreError> {
        let rows = self.store.list(&self.table, query).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(|e| StoreError::decode(e.to_string())))
            .collect()
    }

    pub async fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        match self.store.get(&self.table, id).await? {
            Some(row) => serde_json::from_value(row)
                .map(Some)
                .map_err(|e| StoreError::decode(e.to_string())),
            None => Ok(None),
        }
    }

    pub async fn insert(&self, record: &T) -> Result<T, StoreError> {
        let row = serde_json::to_value(record).map_err(|e| StoreError::decode(e.to_string()))?;
        let stored = self.store.insert(&self.table, row).await?;
        serde_json::from_value(stored).map_err(|e| StoreError::decode(e.to_string()))
    }

    pub async fn update(&self, id: &str, partial: Value) -> Result<(), StoreError> {
        self.store.update(&self.table, id, partial).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(&self.table, id).await
    }
}
