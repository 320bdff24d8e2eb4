//! # bulkload
//!
//! Bounded-concurrency bulk loading of in-memory collections into a
//! key-value table.
//!
//! ## Overview
//!
//! A load provisions the destination table once, then writes each
//! collection in the order it was declared. Within a collection up to a
//! configurable number of writes are in flight at any time; collections
//! themselves run one after another. A record that fails to write is
//! reported and the load carries on; a store that becomes unusable aborts
//! the load.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use bulkload::loader::{LoadCoordinator, LoadPlan};
//! use bulkload::record::Record;
//! use bulkload::store::MemoryTable;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Task {
//!     task: String,
//! }
//!
//! impl Record for Task {
//!     const ENTITY: &'static str = "task";
//!
//!     fn record_key(&self) -> String {
//!         self.task.clone()
//!     }
//! }
//!
//! # async fn example() -> bulkload::Result<()> {
//! let table = Arc::new(MemoryTable::new("taskmanager"));
//! let tasks = vec![Task { task: "write docs".into() }];
//!
//! let plan = LoadPlan::new().add(tasks, table.clone(), 3);
//! let report = LoadCoordinator::new(table).load(plan).await?;
//!
//! assert_eq!(report.total_succeeded(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`record`]: the `Record` trait every loadable item implements
//! - [`store`]: store capabilities, in-memory table and retry decorator
//! - [`batch`]: bounded-concurrency writer for one collection
//! - [`loader`]: load plans, coordination and reports
//! - [`dataset`]: static JSON datasets
//! - [`config`]: loader configuration

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

use thiserror::Error;

/// Result type for loader operations
pub type Result<T> = std::result::Result<T, LoadError>;

/// Main error type for loader operations
#[derive(Error, Debug)]
pub enum LoadError {
    /// The destination table could not be made ready; nothing was written
    #[error("Store preparation failed: {0}")]
    Preparation(#[source] store::StoreError),

    /// A collection hit an unrecoverable store error; later collections were skipped
    #[error("Load aborted: {error}")]
    Unrecoverable {
        /// The failure that stopped the load
        #[source]
        error: batch::UnrecoverableBatchError,
        /// Results of the collections processed so far, the aborted one included
        report: Box<loader::LoadReport>,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Dataset missing a collection or holding undecodable items
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    /// Report of the work done before an unrecoverable failure, if any
    pub fn partial_report(&self) -> Option<&loader::LoadReport> {
        match self {
            LoadError::Unrecoverable { report, .. } => Some(report.as_ref()),
            _ => None,
        }
    }
}

/// Records handed to the loader
pub mod record;

/// Store capabilities consumed by the loader
pub mod store;

/// Bounded-concurrency writing of one collection
pub mod batch;

/// Multi-collection loading
pub mod loader;

/// Static datasets
pub mod dataset;

/// Loader configuration
pub mod config;

pub use batch::{BatchResult, BatchWriter, WriteFailure};
pub use config::LoaderConfig;
pub use loader::{LoadCoordinator, LoadPlan, LoadReport};
pub use record::Record;
