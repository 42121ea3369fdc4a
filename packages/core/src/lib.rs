//! Storefront Core Business Logic Layer
//!
//! This crate provides the data management, catalog operations, and service
//! orchestration for a small-business storefront backend.
//!
//! # Architecture
//!
//! - **Remote source of truth**: All catalog tables live in a hosted
//!   relational backend, reached through a REST gateway; mutations are
//!   followed by a re-fetch so callers always observe their own writes
//! - **Validate before send**: Entity payloads are checked against local
//!   schemas before any network call
//! - **Trees from flat rows**: Categories and variation attributes are flat,
//!   parent-linked rows turned into trees at read time
//! - **No silent failure**: Remote errors are logged, surfaced as a
//!   notification, and re-thrown
//!
//! # Modules
//!
//! - [`models`] - Data structures (Category, Product, Order, etc.)
//! - [`hierarchy`] - Generic parent-linked tree construction
//! - [`store`] - Remote table gateway and local persisted state
//! - [`validation`] - Entity schemas and payload validation
//! - [`services`] - Feature services (categories, attributes, migrations)
//! - [`config`] - Remote backend configuration

pub mod config;
pub mod hierarchy;
pub mod models;
pub mod services;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use config::RemoteConfig;
pub use hierarchy::{HierarchyBuilder, HierarchyError, HierarchyRecord, TreeNode};
pub use models::*;
pub use services::*;
pub use store::*;
pub use validation::*;
