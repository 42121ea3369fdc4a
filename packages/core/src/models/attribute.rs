//! Product variation attributes and their options.

use crate::hierarchy::HierarchyRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A variation attribute (e.g. "Size", "Color") from the
/// `variation_attributes` table.
///
/// Attributes can be grouped: `parent_id` points at a parent attribute group,
/// so the attribute list renders as a tree like categories do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariationAttribute {
    /// Unique identifier (UUID string)
    pub id: String,

    /// Display name (e.g. "Size")
    pub name: String,

    /// Parent attribute group id, `None` for top-level attributes
    pub parent_id: Option<String>,

    /// Sibling ordering key, ascending
    pub sort_order: i64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
}

impl VariationAttribute {
    /// Create a new attribute with a generated id and current timestamps.
    pub fn new(name: impl Into<String>, parent_id: Option<String>, sort_order: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            parent_id,
            sort_order,
            created_at: now,
            modified_at: now,
        }
    }
}

impl HierarchyRecord for VariationAttribute {
    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }
}

/// A single selectable value of a variation attribute (e.g. "XL" under
/// "Size"), from the `attribute_options` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeOption {
    /// Unique identifier (UUID string)
    pub id: String,

    /// Owning attribute id
    pub attribute_id: String,

    /// Option value shown to the user
    pub value: String,

    /// Sibling ordering key within the attribute, ascending
    pub sort_order: i64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
}

impl AttributeOption {
    /// Create a new option with a generated id and current timestamps.
    pub fn new(
        attribute_id: impl Into<String>,
        value: impl Into<String>,
        sort_order: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            attribute_id: attribute_id.into(),
            value: value.into(),
            sort_order,
            created_at: now,
            modified_at: now,
        }
    }
}
