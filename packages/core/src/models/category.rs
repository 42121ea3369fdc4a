//! Product category record.

use crate::hierarchy::HierarchyRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product category as stored in the `categories` table.
///
/// Categories are self-referential: `parent_id` points at another category
/// or is `None` for top-level categories. Siblings sort by `sort_order`
/// ascending with name as the tie-break.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier (UUID string)
    pub id: String,

    /// Display name
    pub name: String,

    /// Parent category id, `None` for top-level categories
    pub parent_id: Option<String>,

    /// Sibling ordering key, ascending
    pub sort_order: i64,

    /// Whether the category is shown in the storefront
    #[serde(default = "default_active")]
    pub active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Category {
    /// Create a new category with a generated id and current timestamps.
    pub fn new(name: impl Into<String>, parent_id: Option<String>, sort_order: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            parent_id,
            sort_order,
            active: true,
            created_at: now,
            modified_at: now,
        }
    }
}

impl HierarchyRecord for Category {
    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }
}
