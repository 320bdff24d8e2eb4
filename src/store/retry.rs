//! Caller-side retry for record writes
//!
//! The batch writer records a failed write and moves on. Callers that want
//! transient failures retried wrap their store in a [`RetryingStore`] before
//! handing it to the writer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, warn};

use crate::record::Record;
use crate::store::{RecordStore, StoreError};

/// Backoff strategy for retries
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Same delay before every retry
    Fixed(Duration),
    /// Delay grows by a constant step per retry
    Linear {
        /// Delay before the first retry
        base: Duration,
        /// Added for each further retry
        increment: Duration,
    },
    /// Delay multiplies per retry, capped at `max`
    Exponential {
        /// Delay before the first retry
        base: Duration,
        /// Growth factor per retry
        multiplier: f64,
        /// Upper bound on any delay
        max: Duration,
    },
}

impl BackoffStrategy {
    /// Delay before retry number `attempt` (1-based)
    ///
    /// Never panics: growth that overflows saturates, at `max` for the
    /// exponential strategy and at [`Duration::MAX`] for the linear one. A
    /// multiplier that is negative or not finite also yields `max`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let steps = attempt.max(1) - 1;
        match self {
            BackoffStrategy::Fixed(duration) => *duration,
            BackoffStrategy::Linear { base, increment } => increment
                .checked_mul(steps)
                .and_then(|grown| base.checked_add(grown))
                .unwrap_or(Duration::MAX),
            BackoffStrategy::Exponential { base, multiplier, max } => {
                let exponent = i32::try_from(steps).unwrap_or(i32::MAX);
                let factor = multiplier.powi(exponent);
                if !factor.is_finite() || factor < 0.0 {
                    return *max;
                }
                Duration::try_from_secs_f64(base.as_secs_f64() * factor)
                    .map_or(*max, |delay| delay.min(*max))
            }
        }
    }
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        BackoffStrategy::Exponential {
            base: Duration::from_millis(100),
            multiplier: 2.0,
            max: Duration::from_secs(5),
        }
    }
}

/// Predicate deciding whether a failed write is retried
pub type RetryPredicate = Arc<dyn Fn(&StoreError) -> bool + Send + Sync>;

/// Store decorator that retries failed writes
pub struct RetryingStore<S> {
    inner: S,
    max_attempts: u32,
    backoff: BackoffStrategy,
    jitter: bool,
    retry_if: RetryPredicate,
}

impl<S> RetryingStore<S> {
    /// Wrap a store; transient errors are retried up to 3 attempts in total
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            max_attempts: 3,
            backoff: BackoffStrategy::default(),
            jitter: true,
            retry_if: Arc::new(StoreError::is_transient),
        }
    }

    /// Total attempts per write, including the first
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the delay schedule between attempts
    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Add up to 50% random jitter to each delay
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Replace the default transient-error predicate
    pub fn with_retry_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&StoreError) -> bool + Send + Sync + 'static,
    {
        self.retry_if = Arc::new(predicate);
        self
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn retry_delay(&self, attempt: u32) -> Duration {
        let delay = self.backoff.delay(attempt);
        if self.jitter && !delay.is_zero() {
            let factor = rand::thread_rng().gen_range(1.0..1.5);
            Duration::try_from_secs_f64(delay.as_secs_f64() * factor).unwrap_or(delay)
        } else {
            delay
        }
    }
}

#[async_trait]
impl<R, S> RecordStore<R> for RetryingStore<S>
where
    R: Record,
    S: RecordStore<R>,
{
    async fn put(&self, record: &R) -> Result<(), StoreError> {
        let mut attempt = 1u32;
        loop {
            match self.inner.put(record).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.max_attempts && (self.retry_if)(&e) => {
                    let delay = self.retry_delay(attempt);
                    debug!(
                        entity = R::ENTITY,
                        record_key = %record.record_key(),
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Write failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    if attempt > 1 {
                        warn!(
                            entity = R::ENTITY,
                            record_key = %record.record_key(),
                            attempts = attempt,
                            error = %e,
                            "Write failed after retries"
                        );
                    }
                    return Err(e);
                }
            }
        }
    }
}
