use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use crate::record::Record;
use crate::store::{RecordStore, StoreError, TableProvisioner};

/// In-memory key-value table
///
/// Items are stored as JSON under `(entity, record_key)`. Writes issued
/// before [`TableProvisioner::ensure_ready`] fail with
/// [`StoreError::Unavailable`], mirroring a table that does not exist yet.
#[derive(Clone)]
pub struct MemoryTable {
    name: String,
    items: Arc<DashMap<(String, String), Value>>,
    ready: Arc<AtomicBool>,
    creations: Arc<AtomicUsize>,
}

impl MemoryTable {
    /// Create a new, not yet provisioned, table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Arc::new(DashMap::new()),
            ready: Arc::new(AtomicBool::new(false)),
            creations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the table has been provisioned
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Number of times the table was actually created
    pub fn creations(&self) -> usize {
        self.creations.load(Ordering::SeqCst)
    }

    /// Total number of stored items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the table holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of stored items for one entity type
    pub fn count(&self, entity: &str) -> usize {
        self.items.iter().filter(|entry| entry.key().0 == entity).count()
    }

    /// Fetch a stored item
    pub fn get(&self, entity: &str, key: &str) -> Option<Value> {
        self.items
            .get(&(entity.to_string(), key.to_string()))
            .map(|entry| entry.value().clone())
    }
}

impl Default for MemoryTable {
    fn default() -> Self {
        Self::new("electro")
    }
}

#[async_trait]
impl TableProvisioner for MemoryTable {
    async fn ensure_ready(&self) -> Result<(), StoreError> {
        if self
            .ready
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.creations.fetch_add(1, Ordering::SeqCst);
            debug!(table = %self.name, "Table created");
        } else {
            debug!(table = %self.name, "Table already exists");
        }
        Ok(())
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for MemoryTable {
    async fn put(&self, record: &R) -> Result<(), StoreError> {
        if !self.is_ready() {
            return Err(StoreError::Unavailable(format!(
                "table {} does not exist",
                self.name
            )));
        }

        let item = serde_json::to_value(record)?;
        self.items
            .insert((R::ENTITY.to_string(), record.record_key()), item);
        Ok(())
    }
}
