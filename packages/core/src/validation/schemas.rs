//! Entity schemas for the storefront tables.
//!
//! One create/update schema per domain entity. The services run these
//! against user input before anything reaches the remote table gateway.

use crate::models::OrderStatus;
use crate::validation::{EntitySchema, FieldKind, FieldRule, FieldSpec};

/// Schema for `categories` rows.
pub fn category_schema() -> EntitySchema {
    EntitySchema::new(
        "category",
        vec![
            FieldSpec::required("name", FieldKind::Text)
                .rule(FieldRule::MinLen(1))
                .rule(FieldRule::MaxLen(120)),
            FieldSpec::optional("parent_id", FieldKind::Text),
            FieldSpec::optional("sort_order", FieldKind::Integer)
                .with_default(0)
                .rule(FieldRule::Min(0.0)),
            FieldSpec::optional("active", FieldKind::Boolean).with_default(true),
        ],
    )
}

/// Schema for `variation_attributes` rows.
pub fn variation_attribute_schema() -> EntitySchema {
    EntitySchema::new(
        "variation_attribute",
        vec![
            FieldSpec::required("name", FieldKind::Text)
                .rule(FieldRule::MinLen(1))
                .rule(FieldRule::MaxLen(80)),
            FieldSpec::optional("parent_id", FieldKind::Text),
            FieldSpec::optional("sort_order", FieldKind::Integer)
                .with_default(0)
                .rule(FieldRule::Min(0.0)),
        ],
    )
}

/// Schema for `attribute_options` rows.
pub fn attribute_option_schema() -> EntitySchema {
    EntitySchema::new(
        "attribute_option",
        vec![
            FieldSpec::required("attribute_id", FieldKind::Text),
            FieldSpec::required("value", FieldKind::Text)
                .rule(FieldRule::MinLen(1))
                .rule(FieldRule::MaxLen(80)),
            FieldSpec::optional("sort_order", FieldKind::Integer)
                .with_default(0)
                .rule(FieldRule::Min(0.0)),
        ],
    )
}

/// Schema for `products` rows.
pub fn product_schema() -> EntitySchema {
    EntitySchema::new(
        "product",
        vec![
            FieldSpec::required("name", FieldKind::Text)
                .rule(FieldRule::MinLen(1))
                .rule(FieldRule::MaxLen(200)),
            FieldSpec::optional("category_id", FieldKind::Text),
            FieldSpec::required("price_cents", FieldKind::Integer).rule(FieldRule::Min(0.0)),
            FieldSpec::optional("image_url", FieldKind::Text).rule(FieldRule::MaxLen(2048)),
            FieldSpec::optional("active", FieldKind::Boolean).with_default(true),
        ],
    )
}

/// Schema for `clients` rows.
pub fn client_schema() -> EntitySchema {
    EntitySchema::new(
        "client",
        vec![
            FieldSpec::required("name", FieldKind::Text)
                .rule(FieldRule::MinLen(1))
                .rule(FieldRule::MaxLen(200)),
            FieldSpec::optional("email", FieldKind::Text).rule(FieldRule::MaxLen(254)),
            FieldSpec::optional("phone", FieldKind::Text).rule(FieldRule::MaxLen(40)),
            FieldSpec::optional("avatar_url", FieldKind::Text).rule(FieldRule::MaxLen(2048)),
        ],
    )
}

/// Schema for `orders` rows.
pub fn order_schema() -> EntitySchema {
    let statuses = OrderStatus::all().iter().map(|s| s.to_string()).collect();
    EntitySchema::new(
        "order",
        vec![
            FieldSpec::required("client_id", FieldKind::Text),
            FieldSpec::optional("status", FieldKind::Text)
                .with_default("pending")
                .rule(FieldRule::OneOf(statuses)),
            FieldSpec::required("total_cents", FieldKind::Integer).rule(FieldRule::Min(0.0)),
            FieldSpec::optional("note", FieldKind::Text).rule(FieldRule::MaxLen(2000)),
        ],
    )
}
