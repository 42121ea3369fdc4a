//! Variation attributes, their options, and the form autosave snapshot.
//!
//! Attributes form a tree (attribute groups reference a parent attribute);
//! options are a flat, ordered list under one attribute. Both follow the
//! mutate-then-refetch convention of the category service.
//!
//! In-progress variation form state is autosaved as a JSON blob in local
//! state under a fixed key, restorable on next load and explicitly
//! clearable.

use crate::hierarchy::{HierarchyBuilder, TreeNode};
use crate::models::{AttributeOption, VariationAttribute};
use crate::services::{BatchFailure, NotificationCenter, ServiceError};
use crate::store::{Filter, ListQuery, OrderBy, StoreError, TableStore, TypedTable};
use crate::validation::{attribute_option_schema, variation_attribute_schema};
use futures::future::join_all;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// Remote tables backing this service.
pub const ATTRIBUTE_TABLE: &str = "variation_attributes";
pub const OPTION_TABLE: &str = "attribute_options";

/// Local state key of the variation form autosave snapshot.
pub const VARIATION_DRAFT_KEY: &str = "variation_form_draft";

/// Variation attribute feature service.
pub struct AttributeService {
    attributes: TypedTable<VariationAttribute>,
    options: TypedTable<AttributeOption>,
    notifications: Arc<NotificationCenter>,
    local_state: Arc<crate::store::LocalStateStore>,
    builder: HierarchyBuilder,
}

impl AttributeService {
    pub fn new(
        store: Arc<dyn TableStore>,
        notifications: Arc<NotificationCenter>,
        local_state: Arc<crate::store::LocalStateStore>,
    ) -> Self {
        Self {
            attributes: TypedTable::new(store.clone(), ATTRIBUTE_TABLE),
            options: TypedTable::new(store, OPTION_TABLE),
            notifications,
            local_state,
            builder: HierarchyBuilder::default(),
        }
    }

    /// Flat attribute list, sorted by (sort_order, name).
    pub async fn list_attributes(&self) -> Result<Vec<VariationAttribute>, ServiceError> {
        let query = ListQuery::new().order(OrderBy::asc("sort_order"));
        let mut rows = self.surface("Loading attributes", self.attributes.list(query).await)?;
        rows.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(rows)
    }

    /// Attribute forest, rebuilt from a fresh fetch.
    pub async fn attribute_tree(&self) -> Result<Vec<TreeNode<VariationAttribute>>, ServiceError> {
        let rows = self.list_attributes().await?;
        Ok(self.builder.build(&rows)?)
    }

    /// Create an attribute and return the refreshed list.
    pub async fn create_attribute(
        &self,
        name: &str,
        parent_id: Option<String>,
        sort_order: i64,
    ) -> Result<Vec<VariationAttribute>, ServiceError> {
        let mut payload = json!({
            "name": name,
            "parent_id": parent_id,
            "sort_order": sort_order,
        });
        variation_attribute_schema().validate_create(&mut payload)?;

        let record = VariationAttribute::new(name, parent_id, sort_order);
        self.surface("Creating attribute", self.attributes.insert(&record).await)?;

        self.notifications
            .success("Attribute created", record.name.clone());
        self.list_attributes().await
    }

    /// Delete an attribute together with its options.
    ///
    /// Option deletions are issued concurrently with no rollback; if some
    /// fail the attribute itself is left in place so the caller can retry,
    /// and the aggregate is re-thrown as
    /// [`ServiceError::PartialFailure`].
    pub async fn delete_attribute(
        &self,
        id: &str,
    ) -> Result<Vec<VariationAttribute>, ServiceError> {
        let existing = self.surface("Loading attribute", self.attributes.get(id).await)?;
        if existing.is_none() {
            return Err(ServiceError::not_found("attribute", id));
        }

        let options = self.options_for(id).await?;
        let requests = options.iter().map(|option| {
            let table = &self.options;
            async move {
                table.delete(&option.id).await.map_err(|e| BatchFailure {
                    id: option.id.clone(),
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

        if !failures.is_empty() {
            self.notifications.warning(
                "Attribute not deleted",
                format!("{} of {} options could not be removed", failures.len(), options.len()),
            );
            return Err(ServiceError::partial_failure(succeeded, failures));
        }

        self.surface("Deleting attribute", self.attributes.delete(id).await)?;
        self.notifications.success("Attribute deleted", id.to_string());
        self.list_attributes().await
    }

    /// Options of one attribute, sorted by (sort_order, value).
    pub async fn options_for(
        &self,
        attribute_id: &str,
    ) -> Result<Vec<AttributeOption>, ServiceError> {
        let query = ListQuery::new()
            .filter(Filter::eq("attribute_id", attribute_id))
            .order(OrderBy::asc("sort_order"));
        let mut rows = self.surface("Loading options", self.options.list(query).await)?;
        rows.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.value.cmp(&b.value))
        });
        Ok(rows)
    }

    /// Create an option and return the attribute's refreshed option list.
    pub async fn create_option(
        &self,
        attribute_id: &str,
        value: &str,
        sort_order: i64,
    ) -> Result<Vec<AttributeOption>, ServiceError> {
        let mut payload = json!({
            "attribute_id": attribute_id,
            "value": value,
            "sort_order": sort_order,
        });
        attribute_option_schema().validate_create(&mut payload)?;

        let attribute = self
            .surface("Loading attribute", self.attributes.get(attribute_id).await)?;
        if attribute.is_none() {
            return Err(ServiceError::not_found("attribute", attribute_id));
        }

        let record = AttributeOption::new(attribute_id, value, sort_order);
        self.surface("Creating option", self.options.insert(&record).await)?;

        self.notifications
            .success("Option created", record.value.clone());
        self.options_for(attribute_id).await
    }

    /// Reorder options of one attribute; same fire-all/await-all semantics
    /// as category reordering.
    pub async fn reorder_options(
        &self,
        attribute_id: &str,
        moves: &[(String, i64)],
    ) -> Result<Vec<AttributeOption>, ServiceError> {
        let requests = moves.iter().map(|(id, sort_order)| {
            let table = &self.options;
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
            debug!("reordered {} options", succeeded);
            return self.options_for(attribute_id).await;
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

    /// Autosave the in-progress variation form state.
    pub fn save_draft(&self, draft: &Value) -> Result<(), ServiceError> {
        self.local_state.set(VARIATION_DRAFT_KEY, draft.clone())?;
        debug!("variation form draft saved");
        Ok(())
    }

    /// Restore a previously autosaved form state, if any.
    pub fn load_draft(&self) -> Option<Value> {
        self.local_state.get(VARIATION_DRAFT_KEY)
    }

    /// Discard the autosaved form state.
    pub fn clear_draft(&self) -> Result<(), ServiceError> {
        self.local_state.remove(VARIATION_DRAFT_KEY)?;
        Ok(())
    }

    /// Log and notify a gateway failure, then re-throw it.
    fn surface<T>(&self, context: &str, result: Result<T, StoreError>) -> Result<T, ServiceError> {
        result.map_err(|e| {
            self.notifications.report_remote_error(context, &e);
            ServiceError::from(e)
        })
    }
}
