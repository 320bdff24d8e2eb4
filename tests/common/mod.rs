//! Shared test fixtures: sample records and an instrumented store

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bulkload::record::Record;
use bulkload::store::{RecordStore, StoreError, TableProvisioner};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: usize,
}

impl Record for Task {
    const ENTITY: &'static str = "task";

    fn record_key(&self) -> String {
        format!("t{}", self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Office {
    pub id: usize,
}

impl Record for Office {
    const ENTITY: &'static str = "office";

    fn record_key(&self) -> String {
        format!("o{}", self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: usize,
}

impl Record for Employee {
    const ENTITY: &'static str = "employee";

    fn record_key(&self) -> String {
        format!("e{}", self.id)
    }
}

/// Tasks numbered from 1, so `tasks(3)[1]` is record #2 (`t2`)
pub fn tasks(n: usize) -> Vec<Task> {
    (1..=n).map(|id| Task { id }).collect()
}

pub fn offices(n: usize) -> Vec<Office> {
    (1..=n).map(|id| Office { id }).collect()
}

pub fn employees(n: usize) -> Vec<Employee> {
    (1..=n).map(|id| Employee { id }).collect()
}

/// How the store answers a write for one record
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Reject the record
    Reject(String),
    /// Report the store as gone
    Unavailable(String),
    /// Succeed after this delay instead of the default one
    Delay(Duration),
    /// Fail after this delay
    RejectAfter(Duration, String),
    /// Never settle
    Hang,
}

/// Store that records every call and can be told to misbehave per record
///
/// Events are logged as `"ensure_ready"` and `"put <entity>:<key>"`, in the
/// order the calls begin, plus `"table_ready"` once provisioning succeeds.
#[derive(Clone, Default)]
pub struct RecordingStore {
    events: Arc<Mutex<Vec<String>>>,
    behaviors: Arc<Mutex<HashMap<String, Behavior>>>,
    default_delay: Arc<Mutex<Duration>>,
    fail_provisioning: Arc<AtomicBool>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every successful write takes this long
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.default_delay.lock().unwrap() = delay;
        self
    }

    pub fn failing_provisioning(self) -> Self {
        self.fail_provisioning.store(true, Ordering::SeqCst);
        self
    }

    /// Set the behavior for `<entity>:<key>`
    pub fn on(self, target: &str, behavior: Behavior) -> Self {
        self.behaviors
            .lock()
            .unwrap()
            .insert(target.to_string(), behavior);
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Keys of every put, in call order
    pub fn puts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix("put ").map(str::to_string))
            .collect()
    }

    pub fn puts_for(&self, entity: &str) -> Vec<String> {
        let prefix = format!("{}:", entity);
        self.puts()
            .into_iter()
            .filter_map(|p| p.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn log(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl TableProvisioner for RecordingStore {
    async fn ensure_ready(&self) -> Result<(), StoreError> {
        self.log("ensure_ready".to_string());
        tokio::time::sleep(Duration::from_millis(5)).await;
        if self.fail_provisioning.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("cannot create table".to_string()))
        } else {
            self.log("table_ready".to_string());
            Ok(())
        }
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for RecordingStore {
    async fn put(&self, record: &R) -> Result<(), StoreError> {
        let target = format!("{}:{}", R::ENTITY, record.record_key());
        self.log(format!("put {}", target));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let behavior = self.behaviors.lock().unwrap().get(&target).cloned();
        let default_delay = *self.default_delay.lock().unwrap();

        let outcome = match behavior {
            None => {
                tokio::time::sleep(default_delay).await;
                Ok(())
            }
            Some(Behavior::Delay(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            Some(Behavior::Reject(reason)) => {
                tokio::time::sleep(default_delay).await;
                Err(StoreError::Rejected(reason))
            }
            Some(Behavior::RejectAfter(delay, reason)) => {
                tokio::time::sleep(delay).await;
                Err(StoreError::Rejected(reason))
            }
            Some(Behavior::Unavailable(reason)) => {
                tokio::time::sleep(default_delay).await;
                Err(StoreError::Unavailable(reason))
            }
            Some(Behavior::Hang) => std::future::pending().await,
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}
