//! Product, client, and order records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order lifecycle status.
///
/// Stored as lowercase strings in the `orders` table. The set mirrors what
/// the status badges in the management UI understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    InProduction,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Every status value, in lifecycle order. Used by the validation layer
    /// to constrain enum membership.
    pub fn all() -> &'static [&'static str] {
        &[
            "pending",
            "confirmed",
            "in_production",
            "shipped",
            "delivered",
            "cancelled",
        ]
    }
}

/// A product from the `products` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,

    /// Display name
    pub name: String,

    /// Category this product belongs to, if assigned
    pub category_id: Option<String>,

    /// Unit price in cents
    pub price_cents: i64,

    /// Avatar/primary image URL, if uploaded
    pub image_url: Option<String>,

    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Product {
    pub fn new(name: impl Into<String>, category_id: Option<String>, price_cents: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            category_id,
            price_cents,
            image_url: None,
            active: true,
            created_at: now,
            modified_at: now,
        }
    }
}

/// A client (customer) from the `clients` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,

    /// Avatar URL, if set. Resolved URLs are cached process-wide by
    /// `AssetUrlCache`.
    pub avatar_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Client {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: None,
            phone: None,
            avatar_url: None,
            created_at: now,
            modified_at: now,
        }
    }
}

/// An order from the `orders` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub client_id: String,
    pub status: OrderStatus,

    /// Order total in cents
    pub total_cents: i64,

    /// Free-form note shown in the order detail view
    pub note: Option<String>,

    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Order {
    pub fn new(client_id: impl Into<String>, total_cents: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            client_id: client_id.into(),
            status: OrderStatus::Pending,
            total_cents,
            note: None,
            created_at: now,
            modified_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_status_wire_format() {
        assert_eq!(
            serde_json::to_value(OrderStatus::InProduction).unwrap(),
            json!("in_production")
        );
        let status: OrderStatus = serde_json::from_value(json!("shipped")).unwrap();
        assert_eq!(status, OrderStatus::Shipped);
    }

    #[test]
    fn test_order_status_all_covers_every_variant() {
        for value in OrderStatus::all() {
            let parsed: Result<OrderStatus, _> = serde_json::from_value(json!(value));
            assert!(parsed.is_ok(), "unparseable status value: {value}");
        }
    }

    #[test]
    fn test_new_order_starts_pending() {
        let order = Order::new("client-1", 12_500);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_cents, 12_500);
    }
}
