//! Candidate record store
//!
//! The whole record set is one JSON array document. Writes replace the
//! document; there are no partial writes. Every store carries a version so
//! a writer can detect that its base snapshot went stale between `load`
//! and `try_swap`.
//!
//! The document may be edited by hand, so reads are lenient: members with
//! the wrong type load as empty values, and array entries that are not
//! objects are skipped with a warning. The raw entries stay available
//! through [`CandidateStore::load_documents`].

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::model::CandidateRecord;
use crate::{Error, Result};

/// Record set as read at one store version
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub records: Vec<CandidateRecord>,
    pub version: u64,
}

/// Whole-document storage for the candidate record set
pub trait CandidateStore: Send + Sync {
    /// Read the current record set and its version
    fn load(&self) -> Result<Snapshot>;

    /// Read the stored entries exactly as they appear in the document
    fn load_documents(&self) -> Result<Vec<Value>>;

    /// Replace the stored document if it is still at `expected_version`
    ///
    /// Returns the new version. Fails with [`Error::StaleVersion`] when
    /// another write landed after the caller's snapshot.
    fn try_swap(&self, expected_version: u64, records: &[CandidateRecord]) -> Result<u64>;
}

/// Store backed by a single JSON file
///
/// A missing file loads as an empty set. Writes go to a temporary file in
/// the same directory and are renamed over the target.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    version: Mutex<u64>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            version: Mutex::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory of the data file if missing
    pub fn ensure_parent_exists(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
                info!("Created data directory: {}", parent.display());
            }
        }
        Ok(())
    }

    fn read_documents(&self) -> Result<Vec<Value>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Data file {} not found, starting empty", self.path.display());
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write_records(&self, records: &[CandidateRecord]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, records)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

impl CandidateStore for JsonFileStore {
    fn load(&self) -> Result<Snapshot> {
        let version = lock(&self.version)?;
        let records = records_from_documents(self.read_documents()?);
        Ok(Snapshot {
            records,
            version: *version,
        })
    }

    fn load_documents(&self) -> Result<Vec<Value>> {
        let _version = lock(&self.version)?;
        self.read_documents()
    }

    fn try_swap(&self, expected_version: u64, records: &[CandidateRecord]) -> Result<u64> {
        let mut version = lock(&self.version)?;
        check_version(expected_version, *version)?;

        self.write_records(records)?;
        *version += 1;
        debug!(
            "Wrote {} candidate records to {} (version {})",
            records.len(),
            self.path.display(),
            *version
        );
        Ok(*version)
    }
}

/// In-memory store with the same contract, for tests and ephemeral runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Snapshot>,
}

impl MemoryStore {
    pub fn new(records: Vec<CandidateRecord>) -> Self {
        Self {
            inner: Mutex::new(Snapshot {
                records,
                version: 0,
            }),
        }
    }
}

impl CandidateStore for MemoryStore {
    fn load(&self) -> Result<Snapshot> {
        Ok(lock(&self.inner)?.clone())
    }

    fn load_documents(&self) -> Result<Vec<Value>> {
        let inner = lock(&self.inner)?;
        inner
            .records
            .iter()
            .map(|r| serde_json::to_value(r).map_err(Error::from))
            .collect()
    }

    fn try_swap(&self, expected_version: u64, records: &[CandidateRecord]) -> Result<u64> {
        let mut inner = lock(&self.inner)?;
        check_version(expected_version, inner.version)?;

        inner.records = records.to_vec();
        inner.version += 1;
        Ok(inner.version)
    }
}

/// Parse stored entries, skipping any that cannot be read as a record
fn records_from_documents(documents: Vec<Value>) -> Vec<CandidateRecord> {
    documents
        .into_iter()
        .enumerate()
        .filter_map(|(index, doc)| {
            if !doc.is_object() {
                warn!("Skipping stored entry {}: not an object", index);
                return None;
            }
            match serde_json::from_value(doc) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping stored entry {}: {}", index, e);
                    None
                }
            }
        })
        .collect()
}

fn check_version(expected: u64, actual: u64) -> Result<()> {
    if expected != actual {
        return Err(Error::StaleVersion { expected, actual });
    }
    Ok(())
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| Error::Internal("store lock poisoned".to_string()))
}
