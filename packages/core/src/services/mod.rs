//! Business Services
//!
//! This module contains the feature services built on top of the remote
//! table gateway:
//!
//! - `CategoryService` - Category CRUD, tree building, and sibling reordering
//! - `AttributeService` - Variation attributes, options, and form autosave
//! - `MigrationService` - Schema drift detection and safe migration deployment
//! - `NotificationCenter` - User-facing notifications over a broadcast channel
//! - `AssetUrlCache` - Generation-stamped cache of resolved asset URLs
//!
//! Services coordinate between the gateway and application logic: input is
//! validated before any network call, every mutation is followed by a
//! re-fetch, and remote failures are logged, surfaced as a notification, and
//! re-thrown.

pub mod asset_cache;
pub mod attribute_service;
pub mod category_service;
pub mod error;
pub mod migration_service;
pub mod notification;

pub use asset_cache::AssetUrlCache;
pub use attribute_service::{
    AttributeService, ATTRIBUTE_TABLE, OPTION_TABLE, VARIATION_DRAFT_KEY,
};
pub use category_service::{CategoryService, CATEGORY_TABLE};
pub use error::{BatchFailure, ServiceError};
pub use migration_service::{
    diff_snapshots, DeployReport, DeployRequest, DeploySummary, DriftSeverity,
    FunctionMigrationTarget, MigrationService, MigrationTarget, SchemaChange, SchemaDiff,
    TargetResult, TargetStatus,
};
pub use notification::{
    Notification, NotificationCenter, Severity, DEFAULT_TOAST_DURATION_MS, SESSION_MISSING_MARKER,
    TOAST_DURATION_KEY,
};
