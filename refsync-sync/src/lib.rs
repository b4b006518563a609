//! # refsync-sync
//!
//! Batch reconciliation of stored channel/category references against the
//! reference API.
//!
//! Call [`run_sync`] with a [`RecordStore`](refsync_core::RecordStore), a
//! [`ReferenceApi`] and a [`ProgressSink`] to run one full pass: names that
//! drifted are rewritten as each record is processed, references that no
//! longer resolve are unpublished once every page has been read.

pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod finalize;
pub mod parser;
pub mod reconcile;
pub mod resolver;

pub use config::{SyncConfig, BASE_URL_ENV, DEFAULT_BATCH_SIZE};
pub use context::{NoProgress, ProgressSink, RunContext};
pub use driver::{run_sync, BatchDriver, DriverState, Precondition, RunOutcome};
pub use error::{ResolveError, SyncError};
pub use finalize::RunSummary;
pub use parser::{parse, ParsedReference};
pub use resolver::{ApiReference, HttpReferenceApi, ReferenceApi};
