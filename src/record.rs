//! Records handed to the loader

use serde::Serialize;

/// An item belonging to exactly one entity type.
///
/// The loader never inspects a record's attributes; it only needs the
/// entity name to group writes and a key to identify the record in
/// failure reports.
pub trait Record: Serialize + Send + Sync + 'static {
    /// Entity type this record belongs to (e.g. `"task"`)
    const ENTITY: &'static str;

    /// Key identifying this record within its entity type
    fn record_key(&self) -> String;
}
