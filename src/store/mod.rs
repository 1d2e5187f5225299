use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::report::{NewRecord, StoredRecord};

pub use json_file::*;
pub use memory::*;

mod json_file;
mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on result store {path}: {source}")]
    IO {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Result store {path} is not a valid record list: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Persistent collection of measurement results.
pub trait ResultStore: Send + Sync {
    /// Persists a new record, assigning its id and timestamp.
    fn create(&self, record: NewRecord) -> Result<StoredRecord, StoreError>;

    /// Returns at most `limit` records, newest first.
    fn latest(&self, limit: usize) -> Result<Vec<StoredRecord>, StoreError>;
}

/// Record list shared by the store implementations.
#[derive(Debug, Default)]
struct Records {
    records: Vec<StoredRecord>,
    next_id: u64,
}

impl Records {
    fn from_vec(mut records: Vec<StoredRecord>) -> Self {
        records.sort_by_key(order_key);
        let next_id = records.iter().map(|r| r.id).max().map_or(1, |id| id + 1);
        Self { records, next_id }
    }

    /// Builds the next record without inserting it.
    fn prepare(&self, record: NewRecord, timestamp: DateTime<Utc>) -> StoredRecord {
        StoredRecord::from_new(self.next_id.max(1), timestamp, record)
    }

    /// Inserts in (timestamp, id) order; with a steady clock this is a push.
    fn commit(&mut self, record: StoredRecord) {
        self.next_id = record.id + 1;
        let key = order_key(&record);
        let index = self.records.partition_point(|r| order_key(r) <= key);
        self.records.insert(index, record);
    }

    fn latest(&self, limit: usize) -> Vec<StoredRecord> {
        self.records.iter().rev().take(limit).cloned().collect()
    }
}

fn order_key(record: &StoredRecord) -> (DateTime<Utc>, u64) {
    (record.timestamp, record.id)
}
