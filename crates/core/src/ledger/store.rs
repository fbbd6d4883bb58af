//! Append-only persistence for the books.
//!
//! Every change to the books is one [`BookRecord`]. Stores only append and
//! load; the books replay records through the normal validation path.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use khata_shared::types::AccountId;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use super::transaction::Transaction;
use crate::accounts::Account;

/// Journal storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored line is not a valid record.
    #[error("Malformed record on line {line}: {source}")]
    Serialization {
        /// One-based line number.
        line: usize,
        /// Parser error.
        source: serde_json::Error,
    },

    /// A record could not be encoded.
    #[error("Failed to encode record: {0}")]
    Encode(serde_json::Error),
}

/// One persisted change to the books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum BookRecord {
    /// An account was registered.
    AccountOpened(Account),
    /// An account was deactivated.
    AccountDeactivated {
        /// The account.
        account_id: AccountId,
        /// When it was deactivated.
        at: DateTime<Utc>,
    },
    /// A transaction was committed.
    TransactionPosted(Transaction),
}

/// Append-only record store.
///
/// `append` must make the record durable before returning: the books only
/// update in-memory state after it succeeds.
pub trait JournalStore: Send + Sync {
    /// Appends one record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the record could not be written.
    fn append(&self, record: &BookRecord) -> Result<(), StoreError>;

    /// Loads every record in append order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read or a record is malformed.
    fn load(&self) -> Result<Vec<BookRecord>, StoreError>;
}

/// Volatile store used when no journal path is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<BookRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with records.
    #[must_use]
    pub fn with_records(records: Vec<BookRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns true when nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl JournalStore for MemoryStore {
    fn append(&self, record: &BookRecord) -> Result<(), StoreError> {
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn load(&self) -> Result<Vec<BookRecord>, StoreError> {
        Ok(self.records.lock().clone())
    }
}

/// File store writing one JSON record per line.
///
/// Each append is flushed and synced before returning. A failed append is
/// rolled back to the last acknowledged record.
#[derive(Debug)]
pub struct JsonLinesStore {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesStore {
    /// Opens or creates the journal file.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file or its directory cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Path of the journal file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl JsonLinesStore {
    /// Runs `write` against the file and cuts the file back to its previous
    /// length if it fails, so a failed append leaves no bytes behind.
    fn append_with(
        &self,
        write: impl FnOnce(&mut File) -> std::io::Result<()>,
    ) -> Result<(), StoreError> {
        let mut file = self.file.lock();
        let committed_len = file.metadata()?.len();
        if let Err(err) = write(&mut *file) {
            if let Err(truncate_err) = file.set_len(committed_len) {
                error!(
                    path = %self.path.display(),
                    error = %truncate_err,
                    "Failed to roll back partial journal append"
                );
            }
            return Err(StoreError::Io(err));
        }
        Ok(())
    }
}

impl JournalStore for JsonLinesStore {
    fn append(&self, record: &BookRecord) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(record).map_err(StoreError::Encode)?;
        line.push(b'\n');

        self.append_with(|file| {
            file.write_all(&line)?;
            file.flush()?;
            file.sync_data()
        })
    }

    /// Loads every newline-terminated record.
    ///
    /// An unterminated last line was never acknowledged; it is discarded and
    /// truncated away so later appends start on a clean line.
    fn load(&self) -> Result<Vec<BookRecord>, StoreError> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(0))?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;

        let terminated = contents
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |last| last + 1);
        if terminated < contents.len() {
            warn!(
                path = %self.path.display(),
                dropped_bytes = contents.len() - terminated,
                "Discarding unterminated journal tail"
            );
            file.set_len(terminated as u64)?;
        }

        let mut records = Vec::new();
        for (index, line) in contents[..terminated].split(|&b| b == b'\n').enumerate() {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let record = serde_json::from_slice(line).map_err(|source| {
                StoreError::Serialization {
                    line: index + 1,
                    source,
                }
            })?;
            records.push(record);
        }
        Ok(records)
    }
}
