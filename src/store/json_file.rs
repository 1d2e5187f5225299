use std::{fs, io, path::PathBuf};

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info};

use super::{Records, ResultStore, StoreError};
use crate::report::{NewRecord, StoredRecord};

/// Store backed by a JSON array on disk.
///
/// Every `create` rewrites the whole file through a temporary sibling that is
/// renamed over the target, while holding the store lock. A failed write
/// leaves both the file and the in-memory records untouched.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<Records>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty store; a file
    /// that does not hold a record list is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let records = match fs::read(&path) {
            Ok(content) => serde_json::from_slice::<Vec<StoredRecord>>(&content).map_err(
                |source| StoreError::Corrupt {
                    path: path.clone(),
                    source,
                },
            )?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(StoreError::IO { path, source }),
        };

        info!(
            "Opened result store {} with {} records",
            path.display(),
            records.len()
        );

        Ok(Self {
            path,
            records: Mutex::new(Records::from_vec(records)),
        })
    }

    fn persist(&self, records: &[StoredRecord]) -> Result<(), StoreError> {
        let content = serde_json::to_vec_pretty(records)?;
        let tmp_path = self.path.with_extension("json.tmp");

        fs::write(&tmp_path, content)
            .and_then(|_| fs::rename(&tmp_path, &self.path))
            .map_err(|source| StoreError::IO {
                path: self.path.clone(),
                source,
            })
    }
}

impl ResultStore for JsonFileStore {
    fn create(&self, record: NewRecord) -> Result<StoredRecord, StoreError> {
        let mut records = self.records.lock();
        let stored = records.prepare(record, Utc::now());

        let mut snapshot = records.records.clone();
        snapshot.push(stored.clone());
        self.persist(&snapshot)?;

        records.commit(stored.clone());
        debug!("Stored result {} in {}", stored.id, self.path.display());
        Ok(stored)
    }

    fn latest(&self, limit: usize) -> Result<Vec<StoredRecord>, StoreError> {
        Ok(self.records.lock().latest(limit))
    }
}
