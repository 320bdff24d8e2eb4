//! Store capabilities consumed by the loader
//!
//! The loader never talks to a database directly. It needs exactly two
//! things from the destination table:
//!
//! - [`TableProvisioner`]: make sure the table exists before anything is written
//! - [`RecordStore`]: write a single record
//!
//! Batching and concurrency control live in [`crate::batch`], not here.

mod memory;
pub mod retry;

pub use memory::MemoryTable;
pub use retry::{BackoffStrategy, RetryingStore};

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::record::Record;

/// Errors reported by a store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The store refused this particular record
    #[error("Write rejected: {0}")]
    Rejected(String),

    /// The store is shedding load; the write may succeed later
    #[error("Write throttled: {0}")]
    Throttled(String),

    /// The write did not settle in time
    #[error("Write timed out after {0:?}")]
    TimedOut(Duration),

    /// The store itself cannot be reached (connection lost, table missing)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The record could not be encoded for the store
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Whether this error invalidates every further write, not just this one
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }

    /// Whether retrying the same write could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Throttled(_) | StoreError::TimedOut(_))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Idempotent table initialization
#[async_trait]
pub trait TableProvisioner: Send + Sync {
    /// Create the table if it does not exist. Safe to call when it already does.
    async fn ensure_ready(&self) -> Result<(), StoreError>;
}

/// Single-record write access to a table for one record type
///
/// Implementations must tolerate concurrent `put` calls; the loader issues
/// up to its concurrency limit of them at once against the same handle.
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// Write one record
    async fn put(&self, record: &R) -> Result<(), StoreError>;
}
