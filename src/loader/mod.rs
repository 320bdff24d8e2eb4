//! Multi-collection loading

mod coordinator;
mod plan;
mod report;

pub use coordinator::{CoordinatorState, LoadCoordinator};
pub use plan::{Collection, CollectionLoad, LoadPlan};
pub use report::LoadReport;
