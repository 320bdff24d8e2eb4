use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::batch::BatchResult;
use crate::Result;

/// Outcome of a whole load run, one [`BatchResult`] per collection in load order
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    /// Unique identifier of the run
    pub run_id: Uuid,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Per-collection results, in submission order
    pub results: Vec<BatchResult>,
    /// Wall time of the run
    pub duration: Duration,
}

impl LoadReport {
    /// Records submitted across all collections
    pub fn total_records(&self) -> usize {
        self.results.iter().map(|r| r.total).sum()
    }

    /// Records written across all collections
    pub fn total_succeeded(&self) -> usize {
        self.results.iter().map(|r| r.succeeded).sum()
    }

    /// Records that failed across all collections
    pub fn total_failed(&self) -> usize {
        self.results.iter().map(BatchResult::failed).sum()
    }

    /// Whether every record of every collection was written
    pub fn is_clean(&self) -> bool {
        self.results.iter().all(BatchResult::is_clean)
    }

    /// First result for an entity type
    pub fn result_for(&self, entity: &str) -> Option<&BatchResult> {
        self.results.iter().find(|r| r.entity == entity)
    }

    /// Render the report as pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
