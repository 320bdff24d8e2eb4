//! Load coordination
//!
//! Provisions the destination table once, then loads each collection of a
//! [`LoadPlan`] in declared order. Collections never overlap: the next one
//! starts only after the previous batch has fully settled.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::loader::{LoadPlan, LoadReport};
use crate::store::TableProvisioner;
use crate::{LoadError, Result};

/// Lifecycle of a load run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CoordinatorState {
    /// No load has started
    Idle,
    /// Waiting for the table to be provisioned
    Preparing,
    /// Table confirmed ready, no collection started yet
    Ready,
    /// Writing the collection at this position of the plan
    LoadingCollection(usize),
    /// Every collection was processed
    Done,
    /// Preparation or a collection failed unrecoverably
    Failed,
}

/// Runs a [`LoadPlan`] against a provisioned table
pub struct LoadCoordinator {
    provisioner: Arc<dyn TableProvisioner>,
    state: Mutex<CoordinatorState>,
    transitions: Mutex<Vec<CoordinatorState>>,
}

impl LoadCoordinator {
    /// Create a coordinator that provisions through `provisioner`
    pub fn new(provisioner: Arc<dyn TableProvisioner>) -> Self {
        Self {
            provisioner,
            state: Mutex::new(CoordinatorState::Idle),
            transitions: Mutex::new(vec![CoordinatorState::Idle]),
        }
    }

    /// Current state
    pub fn state(&self) -> CoordinatorState {
        *self.state.lock()
    }

    /// Every state entered during the latest load, starting from `Idle`
    pub fn transitions(&self) -> Vec<CoordinatorState> {
        self.transitions.lock().clone()
    }

    fn transition(&self, next: CoordinatorState) {
        let previous = std::mem::replace(&mut *self.state.lock(), next);
        self.transitions.lock().push(next);
        debug!(from = ?previous, to = ?next, "Coordinator state changed");
    }

    /// Provision the table, then load every collection of the plan in order
    ///
    /// Fails with [`LoadError::Preparation`] before any write if the table
    /// cannot be provisioned, and with [`LoadError::Unrecoverable`] as soon
    /// as a collection hits an unrecoverable store error; later collections
    /// are then left untouched. Per-record failures never fail the load, they
    /// are reported in the returned [`LoadReport`].
    #[instrument(
        skip(self, plan),
        fields(collections = plan.len(), records = plan.total_records())
    )]
    pub async fn load(&self, plan: LoadPlan) -> Result<LoadReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let run_start = Instant::now();

        {
            let mut transitions = self.transitions.lock();
            transitions.clear();
            transitions.push(CoordinatorState::Idle);
        }
        *self.state.lock() = CoordinatorState::Idle;

        info!(run_id = %run_id, entities = ?plan.entities(), "Starting load");

        self.transition(CoordinatorState::Preparing);
        if let Err(e) = self.provisioner.ensure_ready().await {
            self.transition(CoordinatorState::Failed);
            error!(run_id = %run_id, error = %e, "Table preparation failed, nothing was written");
            return Err(LoadError::Preparation(e));
        }
        self.transition(CoordinatorState::Ready);

        let mut results = Vec::with_capacity(plan.len());

        for (position, collection) in plan.into_iter().enumerate() {
            self.transition(CoordinatorState::LoadingCollection(position));
            info!(
                position = position,
                entity = collection.entity(),
                records = collection.len(),
                concurrency = collection.concurrency_limit(),
                "Loading collection"
            );

            match collection.run().await {
                Ok(result) => {
                    if !result.is_clean() {
                        warn!(
                            entity = %result.entity,
                            failed = result.failed(),
                            "Collection loaded with failed records"
                        );
                    }
                    results.push(result);
                }
                Err(e) => {
                    self.transition(CoordinatorState::Failed);
                    error!(
                        run_id = %run_id,
                        entity = %e.entity,
                        error = %e,
                        "Load aborted, remaining collections skipped"
                    );
                    results.push(e.partial.clone());
                    let report = LoadReport {
                        run_id,
                        started_at,
                        results,
                        duration: run_start.elapsed(),
                    };
                    return Err(LoadError::Unrecoverable {
                        error: e,
                        report: Box::new(report),
                    });
                }
            }
        }

        self.transition(CoordinatorState::Done);

        let report = LoadReport {
            run_id,
            started_at,
            results,
            duration: run_start.elapsed(),
        };

        info!(
            run_id = %run_id,
            records = report.total_records(),
            succeeded = report.total_succeeded(),
            failed = report.total_failed(),
            duration_ms = report.duration.as_millis() as u64,
            "Load completed"
        );

        Ok(report)
    }
}
