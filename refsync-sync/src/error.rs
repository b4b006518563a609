//! Error types for refsync-sync.

use thiserror::Error;

use refsync_core::StoreError;

use crate::driver::DriverState;

/// Failures of a single reference lookup.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Rejected before any request was sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Connection, DNS, TLS or timeout failure.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The service answered with a non-success status.
    #[error("request to {url} returned HTTP {code}")]
    Status { url: String, code: u16 },

    /// The body was not the JSON object we expect.
    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the record store.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// An error from the reference API.
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// Page size must be at least one record.
    #[error("invalid batch size {0}; must be at least 1")]
    InvalidBatchSize(usize),

    /// A driver stage was called out of order, or a finished driver was reused.
    #[error("batch driver is {actual:?}, expected {expected:?}")]
    InvalidState {
        expected: DriverState,
        actual: DriverState,
    },
}
