//! Static datasets
//!
//! A dataset is a JSON object mapping a collection name to an array of
//! items, e.g. `{"tasks": [...], "offices": [...], "employees": [...]}`.
//! Collections are decoded on demand into typed records.

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::{LoadError, Result};

/// Named collections of raw items
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    collections: BTreeMap<String, Vec<Value>>,
}

impl Dataset {
    /// Parse a dataset from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let collections: BTreeMap<String, Vec<Value>> = serde_json::from_str(json)?;
        Ok(Self { collections })
    }

    /// Read and parse a dataset file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let dataset = Self::from_json_str(&contents)?;
        debug!(
            path = %path.display(),
            collections = dataset.collections.len(),
            "Dataset loaded"
        );
        Ok(dataset)
    }

    /// Collection names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Number of raw items in a collection
    pub fn len_of(&self, name: &str) -> Option<usize> {
        self.collections.get(name).map(Vec::len)
    }

    /// Decode a collection into typed records, preserving item order
    pub fn records<R: DeserializeOwned>(&self, name: &str) -> Result<Vec<R>> {
        let items = self
            .collections
            .get(name)
            .ok_or_else(|| LoadError::Dataset(format!("missing collection: {}", name)))?;

        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                R::deserialize(item).map_err(|e| {
                    LoadError::Dataset(format!("invalid item {} in {}: {}", index, name, e))
                })
            })
            .collect()
    }
}
