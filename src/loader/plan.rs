use std::sync::Arc;

use async_trait::async_trait;

use crate::batch::{BatchResult, BatchWriter, UnrecoverableBatchError};
use crate::record::Record;
use crate::store::RecordStore;

/// One collection bound to the writer that will load it
///
/// Lets collections of different record types share one [`LoadPlan`].
#[async_trait]
pub trait CollectionLoad: Send + Sync {
    /// Entity type of the collection
    fn entity(&self) -> &'static str;

    /// Number of records in the collection
    fn len(&self) -> usize;

    /// Whether the collection has no records
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes in flight while loading this collection
    fn concurrency_limit(&self) -> usize;

    /// Write the whole collection
    async fn run(&self) -> Result<BatchResult, UnrecoverableBatchError>;
}

/// Records of one entity type and their writer
pub struct Collection<R: Record> {
    records: Vec<R>,
    writer: BatchWriter<R>,
}

impl<R: Record> Collection<R> {
    /// Bind records to their writer
    pub fn new(records: Vec<R>, writer: BatchWriter<R>) -> Self {
        Self { records, writer }
    }

    /// Records to be written
    pub fn records(&self) -> &[R] {
        &self.records
    }
}

#[async_trait]
impl<R: Record> CollectionLoad for Collection<R> {
    fn entity(&self) -> &'static str {
        R::ENTITY
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn concurrency_limit(&self) -> usize {
        self.writer.concurrency_limit()
    }

    async fn run(&self) -> Result<BatchResult, UnrecoverableBatchError> {
        self.writer.run(&self.records).await
    }
}

/// Ordered list of collections to load
#[derive(Default)]
pub struct LoadPlan {
    collections: Vec<Box<dyn CollectionLoad>>,
}

impl LoadPlan {
    /// Create an empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a collection written through `store` with `concurrency` writes in flight
    pub fn add<R: Record>(
        self,
        records: Vec<R>,
        store: Arc<dyn RecordStore<R>>,
        concurrency: usize,
    ) -> Self {
        let writer = BatchWriter::new(store).with_concurrency_limit(concurrency);
        self.add_with_writer(records, writer)
    }

    /// Append a collection with a preconfigured writer
    pub fn add_with_writer<R: Record>(mut self, records: Vec<R>, writer: BatchWriter<R>) -> Self {
        self.push(Box::new(Collection::new(records, writer)));
        self
    }

    /// Append an already type-erased collection
    pub fn push(&mut self, collection: Box<dyn CollectionLoad>) {
        self.collections.push(collection);
    }

    /// Number of collections
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Whether the plan has no collections
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Entity types in load order
    pub fn entities(&self) -> Vec<&'static str> {
        self.collections.iter().map(|c| c.entity()).collect()
    }

    /// Total number of records across all collections
    pub fn total_records(&self) -> usize {
        self.collections.iter().map(|c| c.len()).sum()
    }
}

impl IntoIterator for LoadPlan {
    type Item = Box<dyn CollectionLoad>;
    type IntoIter = std::vec::IntoIter<Box<dyn CollectionLoad>>;

    fn into_iter(self) -> Self::IntoIter {
        self.collections.into_iter()
    }
}
