use chrono::Utc;
use parking_lot::Mutex;

use super::{Records, ResultStore, StoreError};
use crate::report::{NewRecord, StoredRecord};

/// In-process store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Records>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for MemoryStore {
    fn create(&self, record: NewRecord) -> Result<StoredRecord, StoreError> {
        let mut records = self.records.lock();
        let stored = records.prepare(record, Utc::now());
        records.commit(stored.clone());
        Ok(stored)
    }

    fn latest(&self, limit: usize) -> Result<Vec<StoredRecord>, StoreError> {
        Ok(self.records.lock().latest(limit))
    }
}
