//! Bounded-concurrency batch writer
//!
//! Writes one collection of records through a [`RecordStore`] while keeping
//! at most `concurrency_limit` writes outstanding:
//! - Sliding window over a `FuturesUnordered`, refilled as each write settles
//! - Dispatch strictly in collection order
//! - Per-record failures are recorded and never stop the batch
//! - Unrecoverable store errors stop dispatch and drain the window
//! - Optional per-write timeout and progress callback

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, error, info, instrument, warn};

use crate::batch::types::{BatchResult, ProgressCallback, UnrecoverableBatchError, WriteFailure};
use crate::config::{LoaderConfig, DEFAULT_CONCURRENCY};
use crate::record::Record;
use crate::store::{RecordStore, StoreError};

/// One in-flight write
struct WriteJob<'a, R: Record> {
    index: usize,
    record: &'a R,
    store: &'a dyn RecordStore<R>,
    timeout: Option<Duration>,
}

impl<'a, R: Record> WriteJob<'a, R> {
    async fn settle(self) -> (usize, Result<(), StoreError>) {
        debug!(entity = R::ENTITY, index = self.index, "Dispatching write");

        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, self.store.put(self.record)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(StoreError::TimedOut(limit)),
            },
            None => self.store.put(self.record).await,
        };

        (self.index, outcome)
    }
}

/// Writes a collection of records with bounded concurrency
pub struct BatchWriter<R: Record> {
    /// Destination for every record
    store: Arc<dyn RecordStore<R>>,
    /// Maximum writes outstanding at once
    concurrency_limit: usize,
    /// Timeout for individual writes
    write_timeout: Option<Duration>,
    /// Progress callback
    progress_callback: Option<Arc<ProgressCallback>>,
}

impl<R: Record> BatchWriter<R> {
    /// Create a writer with the default concurrency limit and no timeout
    pub fn new(store: Arc<dyn RecordStore<R>>) -> Self {
        Self {
            store,
            concurrency_limit: DEFAULT_CONCURRENCY,
            write_timeout: None,
            progress_callback: None,
        }
    }

    /// Create a writer from loader configuration
    pub fn from_config(store: Arc<dyn RecordStore<R>>, config: &LoaderConfig) -> Self {
        let writer = Self::new(store).with_concurrency_limit(config.concurrency);
        match config.write_timeout() {
            Some(timeout) => writer.with_write_timeout(timeout),
            None => writer,
        }
    }

    /// Set concurrency limit (number of writes in flight)
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit.max(1);
        self
    }

    /// Fail any single write that has not settled within `timeout`
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    /// Set progress callback
    pub fn with_progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(Box::new(callback)));
        self
    }

    /// Maximum number of writes in flight
    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Per-write timeout, if any
    pub fn write_timeout(&self) -> Option<Duration> {
        self.write_timeout
    }

    /// Write every record, returning what happened to each of them
    ///
    /// Records are dispatched in slice order. Failed writes are collected in
    /// the result in slice order, whatever order they settled in. Only an
    /// unrecoverable store error ends the batch early; the writes already in
    /// flight are still awaited and reported in the error's partial result.
    #[instrument(
        skip(self, records),
        fields(entity = R::ENTITY, records = records.len(), concurrency = self.concurrency_limit)
    )]
    pub async fn run(&self, records: &[R]) -> Result<BatchResult, UnrecoverableBatchError> {
        let batch_start = Instant::now();

        if records.is_empty() {
            info!("No records to write");
            return Ok(BatchResult::empty(R::ENTITY));
        }

        let total = records.len();
        info!(
            total = total,
            concurrency_limit = self.concurrency_limit,
            write_timeout = ?self.write_timeout,
            "Starting batch write"
        );

        let mut pending = records.iter().enumerate();
        let mut in_flight = FuturesUnordered::new();
        let mut dispatched = 0usize;

        while in_flight.len() < self.concurrency_limit {
            let Some((index, record)) = pending.next() else {
                break;
            };
            in_flight.push(self.job(index, record).settle());
            dispatched += 1;
        }

        let mut succeeded = 0usize;
        let mut settled = 0usize;
        let mut failures = Vec::new();
        let mut fatal: Option<(usize, StoreError)> = None;

        while let Some((index, outcome)) = in_flight.next().await {
            settled += 1;

            match outcome {
                Ok(()) => succeeded += 1,
                Err(e) => {
                    let record_key = records[index].record_key();
                    if e.is_unrecoverable() && fatal.is_none() {
                        error!(
                            index = index,
                            record_key = %record_key,
                            error = %e,
                            "Store became unusable, no further writes will be dispatched"
                        );
                        fatal = Some((index, e.clone()));
                    } else {
                        warn!(index = index, record_key = %record_key, error = %e, "Write failed");
                    }
                    failures.push(WriteFailure {
                        index,
                        record_key,
                        reason: e.to_string(),
                    });
                }
            }

            if let Some(ref callback) = self.progress_callback {
                callback(settled, total);
            }

            if fatal.is_none() {
                if let Some((next_index, record)) = pending.next() {
                    in_flight.push(self.job(next_index, record).settle());
                    dispatched += 1;
                }
            }
        }

        failures.sort_by_key(|failure| failure.index);

        let result = BatchResult {
            entity: R::ENTITY.to_string(),
            total,
            succeeded,
            failures,
            not_attempted: total - dispatched,
            duration: batch_start.elapsed(),
        };

        if let Some((index, source)) = fatal {
            error!(
                succeeded = result.succeeded,
                failed = result.failed(),
                not_attempted = result.not_attempted,
                "Batch write aborted"
            );
            return Err(UnrecoverableBatchError {
                entity: R::ENTITY.to_string(),
                record_key: records[index].record_key(),
                source,
                partial: result,
            });
        }

        let success_rate = result.success_rate();
        info!(
            total = total,
            succeeded = result.succeeded,
            failed = result.failed(),
            success_rate = format!("{:.2}%", success_rate),
            batch_duration_ms = result.duration.as_millis() as u64,
            "Batch write completed"
        );

        if success_rate < 80.0 && total > 5 {
            warn!(
                success_rate = format!("{:.2}%", success_rate),
                failed = result.failed(),
                "High failure rate detected in batch write"
            );
        }

        Ok(result)
    }

    fn job<'a>(&'a self, index: usize, record: &'a R) -> WriteJob<'a, R> {
        WriteJob {
            index,
            record,
            store: self.store.as_ref(),
            timeout: self.write_timeout,
        }
    }
}

impl<R: Record> Clone for BatchWriter<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            concurrency_limit: self.concurrency_limit,
            write_timeout: self.write_timeout,
            progress_callback: self.progress_callback.clone(),
        }
    }
}
