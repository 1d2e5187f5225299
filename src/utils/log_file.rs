use std::{
    fs::{self, File},
    io,
    path::Path,
};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("I/O error: {0}")]
    IO(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// The value did not serialize to a JSON object, so it has no field names
    #[error("Log record must serialize to an object, got {0}")]
    NotARecord(&'static str),
}

/// Content found in an existing JSON log before appending to it.
#[derive(Debug, Clone, PartialEq)]
pub enum ExistingLog {
    /// The file held a JSON array
    Parsed(Vec<Value>),
    /// The file was empty or unreadable as a JSON array; its content is dropped
    Recovered,
}

impl ExistingLog {
    pub fn parse(content: &[u8]) -> Self {
        match serde_json::from_slice::<Vec<Value>>(content) {
            Ok(entries) => ExistingLog::Parsed(entries),
            Err(_) => ExistingLog::Recovered,
        }
    }
}

/// What [`FileLogger::log_to_json`] did to the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonLogOutcome {
    /// File did not exist; it now holds a single entry
    Created,
    /// Entry appended to the existing array
    Appended { entries: usize },
    /// Existing content was not a JSON array and was replaced
    Recovered { entries: usize },
}

/// Appends records to JSON-array or CSV log files.
///
/// Holds no state: every call opens the target, reads it if needed, writes
/// and closes it again. Calls against the same path are not synchronized.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLogger;

impl FileLogger {
    /// Appends `data` to the JSON array stored at `file_path`, creating the
    /// file if needed. Corrupt or empty content is discarded rather than
    /// reported as an error.
    pub fn log_to_json<T>(&self, data: &T, file_path: &Path) -> Result<JsonLogOutcome, LogError>
    where
        T: Serialize + ?Sized,
    {
        let entry = serde_json::to_value(data)?;
        let existed = file_path.exists();

        let (mut entries, recovered) = if existed {
            match ExistingLog::parse(&fs::read(file_path)?) {
                ExistingLog::Parsed(entries) => (entries, false),
                ExistingLog::Recovered => {
                    warn!(
                        "JSON log {} is empty or corrupted, starting a new array",
                        file_path.display()
                    );
                    (Vec::new(), true)
                }
            }
        } else {
            (Vec::new(), false)
        };

        entries.push(entry);
        fs::write(file_path, serde_json::to_string_pretty(&entries)?)?;
        Ok(if !existed {
            JsonLogOutcome::Created
        } else if recovered {
            JsonLogOutcome::Recovered {
                entries: entries.len(),
            }
        } else {
            JsonLogOutcome::Appended {
                entries: entries.len(),
            }
        })
    }

    /// Appends `data` as one CSV row to `file_path`. The header row is
    /// written only when the file is missing or empty.
    ///
    /// Field order follows the serialized field order of `data`. Every call
    /// against one file must use the same set of fields. Rows end with `\n`,
    /// booleans are written `true`/`false` and numbers as serde_json prints
    /// them (`100.0`).
    pub fn log_to_csv<T>(&self, data: &T, file_path: &Path) -> Result<(), LogError>
    where
        T: Serialize + ?Sized,
    {
        let fields = match serde_json::to_value(data)? {
            Value::Object(fields) => fields,
            other => return Err(LogError::NotARecord(json_kind(&other))),
        };

        let write_header = match fs::metadata(file_path) {
            Ok(metadata) => metadata.len() == 0,
            Err(e) if e.kind() == io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };

        let file = File::options()
            .append(true)
            .create(true)
            .open(file_path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);

        if write_header {
            writer.write_record(fields.keys())?;
        }
        writer.write_record(fields.values().map(csv_field))?;
        writer.flush()?;

        Ok(())
    }
}

fn csv_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
