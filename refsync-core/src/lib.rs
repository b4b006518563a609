//! refsync core library: record types, record stores, errors.
//!
//! - [`types`]: newtypes and the [`Record`] struct
//! - [`error`]: [`StoreError`]
//! - [`store`]: the [`RecordStore`] trait with file-backed and in-memory implementations

pub mod error;
pub mod store;
pub mod types;

pub use error::StoreError;
pub use store::{FileRecordStore, MemoryRecordStore, RecordStore};
pub use types::{FieldKind, Record, RecordId, RecordStatus};
