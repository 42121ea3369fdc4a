//! Remote Table Gateway
//!
//! Thin wrapper issuing select/insert/update/delete calls against named
//! remote tables with filter/order/pagination parameters, returning parsed
//! rows or a typed failure. All feature services depend on this layer.
//!
//! # Architecture
//!
//! - [`TableStore`] - the gateway trait (single-shot, no retry)
//! - [`RestStore`] - the hosted backend's REST table protocol
//! - [`MemoryStore`] - in-memory implementation with failure scripting (tests)
//! - [`TypedTable`] - typed view converting rows at the gateway edge
//! - [`LocalStateStore`] - file-backed local key-value state

mod error;
mod local_state;
mod memory_store;
mod rest_store;
mod table_store;

pub use error::StoreError;
pub use local_state::{LocalStateError, LocalStateStore};
pub use memory_store::{MemoryStore, StoreOp};
pub use rest_store::RestStore;
pub use table_store::{Filter, FilterOp, ListQuery, OrderBy, Range, TableStore, TypedTable};
