//! Batch outcome types

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Callback for progress updates: `(settled, total)`
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

/// A record whose write failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteFailure {
    /// Position of the record in its collection
    pub index: usize,
    /// Key of the failed record
    pub record_key: String,
    /// Why the write failed
    pub reason: String,
}

/// Outcome of writing one collection
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// Entity type of the collection
    pub entity: String,
    /// Number of records submitted
    pub total: usize,
    /// Number of records written successfully
    pub succeeded: usize,
    /// Failed records, in collection order
    pub failures: Vec<WriteFailure>,
    /// Records never dispatched because the batch was aborted
    pub not_attempted: usize,
    /// Wall time of the batch
    pub duration: Duration,
}

impl BatchResult {
    /// Result for a collection with nothing to write
    pub fn empty(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            total: 0,
            succeeded: 0,
            failures: Vec::new(),
            not_attempted: 0,
            duration: Duration::ZERO,
        }
    }

    /// Number of failed records
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Whether every submitted record was either written or recorded as failed
    pub fn is_complete(&self) -> bool {
        self.succeeded + self.failures.len() == self.total
    }

    /// Whether every submitted record was written
    pub fn is_clean(&self) -> bool {
        self.succeeded == self.total
    }

    /// Percentage of records written successfully
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.succeeded as f64 / self.total as f64) * 100.0
        }
    }
}

/// A failure outside the per-record channel; the store can no longer be written to
#[derive(Error, Debug, Clone)]
#[error("Unrecoverable failure writing {entity} record {record_key}: {source}")]
pub struct UnrecoverableBatchError {
    /// Entity type of the aborted collection
    pub entity: String,
    /// Record whose write surfaced the failure
    pub record_key: String,
    /// Underlying store error
    #[source]
    pub source: StoreError,
    /// What had settled when the batch stopped
    pub partial: BatchResult,
}
