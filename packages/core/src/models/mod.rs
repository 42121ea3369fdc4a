//! Data Models
//!
//! Flat storage records as they live in the hosted backend's tables. Records
//! reference parents by id only; the nested tree representation is built on
//! demand by [`crate::hierarchy`] and never persisted.

mod attribute;
mod catalog;
mod category;
mod schema_snapshot;

pub use attribute::{AttributeOption, VariationAttribute};
pub use catalog::{Client, Order, OrderStatus, Product};
pub use category::Category;
pub use schema_snapshot::{ColumnSchema, SchemaSnapshot, TableSchema};
