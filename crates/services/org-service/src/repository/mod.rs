//! Repository layer for data access.

pub mod entities;
mod memory_store;
mod record_store;
mod sql_store;

pub use memory_store::MemoryStore;
pub use record_store::{RecordStore, Row, Table};
pub use sql_store::SqlStore;

#[cfg(any(test, feature = "test-utils"))]
pub use record_store::MockRecordStore;
