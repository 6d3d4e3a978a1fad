//! Persistent record store backing offline behavior
//!
//! Provides an `OfflineStore` that keeps serializable records as JSON files in
//! a platform data directory, grouped into collections and keyed by id. Each
//! write replaces the whole file, so the previous record is never left
//! half-written.

use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

/// Errors from offline store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("store I/O failed: {0}")]
    Io(#[from] io::Error),

    /// A record on disk could not be encoded or decoded
    #[error("store record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk envelope around a stored record
#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    /// The stored record
    data: T,
    /// When the record was last written
    saved_at: DateTime<Utc>,
}

/// A record read back from the store, with its write timestamp
#[derive(Debug)]
pub struct StoredRecord<T> {
    /// The stored record
    pub data: T,
    /// When the record was last written
    pub saved_at: DateTime<Utc>,
}

/// CRUD store over JSON files, one collection per subdirectory
///
/// Ids and collection names become file and directory names, so callers should
/// stick to path-safe identifiers (the app uses short alphanumeric ids).
#[derive(Debug, Clone)]
pub struct OfflineStore {
    /// Directory all collections live under
    root: PathBuf,
}

impl OfflineStore {
    /// Creates a store in the platform data directory
    ///
    /// Returns `None` if the platform directory cannot be determined (e.g. no
    /// home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "tubefetch")?;
        let root = project_dirs.data_dir().to_path_buf();
        Some(Self { root })
    }

    /// Creates a store rooted at a specific directory
    ///
    /// Useful for testing or when a specific location is needed.
    pub fn with_dir(root: PathBuf) -> Self {
        Self { root }
    }

    /// Path to the file holding `id` within `collection`
    fn record_path(&self, collection: &str, id: &str) -> PathBuf {
        self.root.join(collection).join(format!("{id}.json"))
    }

    /// Writes a record, replacing any previous record under the same id
    pub fn put<T: Serialize>(&self, collection: &str, id: &str, data: &T) -> Result<(), StoreError> {
        fs::create_dir_all(self.root.join(collection))?;

        let envelope = Envelope {
            data,
            saved_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&envelope)?;
        fs::write(self.record_path(collection, id), json)?;
        Ok(())
    }

    /// Reads a record back, or `None` when the id was never written
    ///
    /// A record that exists but cannot be decoded is an error, not a miss;
    /// data already written must not silently disappear.
    pub fn get<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<StoredRecord<T>>, StoreError> {
        let path = self.record_path(collection, id);
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let envelope: Envelope<T> = serde_json::from_str(&content)?;
        Ok(Some(StoredRecord {
            data: envelope.data,
            saved_at: envelope.saved_at,
        }))
    }

    /// Deletes a record; Ok when the id was never written
    pub fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.record_path(collection, id)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Lists the ids present in a collection, in no particular order
    pub fn list_ids(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.root.join(collection);
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        Ok(ids)
    }
}
