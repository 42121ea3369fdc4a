//! Category CRUD and tree management.
//!
//! Mutations go through the remote table gateway and are followed by an
//! unconditional re-fetch of the full list, trading network cost for
//! consistency with the remote source of truth: callers always observe
//! their own write in the returned list.
//!
//! Remote failures are logged, surfaced as a notification, and re-thrown so
//! outer workflows can apply their own recovery.

use crate::hierarchy::{HierarchyBuilder, TreeNode};
use crate::models::Category;
use crate::services::{BatchFailure, NotificationCenter, ServiceError};
use crate::store::{ListQuery, OrderBy, StoreError, TableStore, TypedTable};
use crate::validation::category_schema;
use futures::future::join_all;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// Remote table backing this service.
pub const CATEGORY_TABLE: &str = "categories";

/// Category feature service.
pub struct CategoryService {
    table: TypedTable<Category>,
    notifications: Arc<NotificationCenter>,
    builder: HierarchyBuilder,
}

impl CategoryService {
    /// Create a service over the given gateway, with the default tree
    /// policies (orphans promoted to roots, cycles rejected).
    pub fn new(store: Arc<dyn TableStore>, notifications: Arc<NotificationCenter>) -> Self {
        Self {
            table: TypedTable::new(store, CATEGORY_TABLE),
            notifications,
            builder: HierarchyBuilder::default(),
        }
    }

    /// Override the tree-building policies.
    pub fn with_builder(mut self, builder: HierarchyBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Full category list, sorted by (sort_order, name).
    ///
    /// The backend orders by `sort_order`; the name tie-break is applied
    /// locally so sibling order is stable across reloads even when sort
    /// orders collide.
    pub async fn list(&self) -> Result<Vec<Category>, ServiceError> {
        let query = ListQuery::new().order(OrderBy::asc("sort_order"));
        let mut rows = self.surface("Loading categories", self.table.list(query).await)?;
        rows.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(rows)
    }

    /// Category forest, rebuilt from a fresh fetch.
    pub async fn tree(&self) -> Result<Vec<TreeNode<Category>>, ServiceError> {
        let rows = self.list().await?;
        Ok(self.builder.build(&rows)?)
    }

    /// Create a category and return the refreshed list.
    pub async fn create(
        &self,
        name: &str,
        parent_id: Option<String>,
        sort_order: i64,
    ) -> Result<Vec<Category>, ServiceError> {
        let mut payload = json!({
            "name": name,
            "parent_id": parent_id,
            "sort_order": sort_order,
        });
        category_schema().validate_create(&mut payload)?;

        let record = Category::new(name, parent_id, sort_order);
        self.surface("Creating category", self.table.insert(&record).await)?;

        self.notifications
            .success("Category created", record.name.clone());
        self.list().await
    }

    /// Apply a partial update and return the refreshed list.
    pub async fn update(&self, id: &str, partial: Value) -> Result<Vec<Category>, ServiceError> {
        category_schema().validate_update(&partial)?;

        let existing = self.surface("Loading category", self.table.get(id).await)?;
        if existing.is_none() {
            return Err(ServiceError::not_found("category", id));
        }

        self.surface("Updating category", self.table.update(id, partial).await)?;
        self.notifications.success("Category updated", id.to_string());
        self.list().await
    }

    /// Delete a category and return the refreshed list.
    ///
    /// Children of the deleted category keep their `parent_id` and show up
    /// as roots on the next tree build (orphan promotion).
    pub async fn delete(&self, id: &str) -> Result<Vec<Category>, ServiceError> {
        let existing = self.surface("Loading category", self.table.get(id).await)?;
        if existing.is_none() {
            return Err(ServiceError::not_found("category", id));
        }

        self.surface("Deleting category", self.table.delete(id).await)?;
        self.notifications.success("Category deleted", id.to_string());
        self.list().await
    }

    /// Reorder sibling categories: one update request per record, issued
    /// concurrently (fire-all, await-all), with no rollback of the requests
    /// that succeeded.
    ///
    /// On full success returns the refreshed list. On partial failure the
    /// aggregate is surfaced as a warning notification and re-thrown as
    /// [`ServiceError::PartialFailure`]; the caller can re-fetch to see
    /// which positions moved.
    pub async fn reorder(&self, moves: &[(String, i64)]) -> Result<Vec<Category>, ServiceError> {
        let requests = moves.iter().map(|(id, sort_order)| {
            let table = &self.table;
            async move {
                table
                    .update(id, json!({ "sort_order": sort_order }))
                    .await
                    .map_err(|e| BatchFailure {
                        id: id.clone(),
                        message: e.to_string(),
                    })
            }
        });

        let results = join_all(requests).await;

        let mut succeeded = 0;
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(()) => succeeded += 1,
                Err(failure) => failures.push(failure),
            }
        }

        if failures.is_empty() {
            debug!("reordered {} categories", succeeded);
            return self.list().await;
        }

        self.notifications.warning(
            "Reorder incomplete",
            format!(
                "{} of {} position updates failed",
                failures.len(),
                moves.len()
            ),
        );
        Err(ServiceError::partial_failure(succeeded, failures))
    }

    /// Log and notify a gateway failure, then re-throw it.
    fn surface<T>(&self, context: &str, result: Result<T, StoreError>) -> Result<T, ServiceError> {
        result.map_err(|e| {
            self.notifications.report_remote_error(context, &e);
            ServiceError::from(e)
        })
    }
}
