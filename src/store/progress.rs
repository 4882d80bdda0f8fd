//! Append-only progress store.
//!
//! The output CSV doubles as the checkpoint: on startup the identifiers of
//! all previously persisted rows form the completed-key set, and appending
//! one row per finished query is the only write this process ever performs.
//! Nothing is rewritten or deleted here.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::AppError;

pub const HEADERS: [&str; 3] = ["Code", "X", "Y"];

/// Coordinate value stored when the map service has no match for an id.
pub const NOT_FOUND: &str = "Not Found";
/// Coordinate value stored when the query itself failed.
pub const ERROR: &str = "Error";

/// One persisted row: the id plus its two coordinate display values, or a
/// sentinel pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressRecord {
    pub code: String,
    pub x: String,
    pub y: String,
}

impl ProgressRecord {
    pub fn new(code: impl Into<String>, x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            x: x.into(),
            y: y.into(),
        }
    }
}

/// Durable record store over a single CSV file.
pub struct ProgressStore {
    path: PathBuf,
    strict: bool,
}

impl ProgressStore {
    /// `strict` controls the corruption policy of [`load_completed_keys`]:
    /// abort the run instead of silently reprocessing everything.
    ///
    /// [`load_completed_keys`]: Self::load_completed_keys
    pub fn new(path: impl Into<PathBuf>, strict: bool) -> Self {
        Self {
            path: path.into(),
            strict,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rebuild the checkpoint from the identifiers already on disk.
    ///
    /// Missing file: empty set (fresh run). Unparsable file: empty set with
    /// a warning, trading reprocessed work for a run that still makes
    /// progress; under `strict` it is an error instead.
    pub fn load_completed_keys(&self) -> Result<HashSet<String>, AppError> {
        if !self.path.exists() {
            debug!("Progress store {} does not exist yet", self.path.display());
            return Ok(HashSet::new());
        }

        match self.read_keys() {
            Ok(keys) => Ok(keys),
            Err(e) if self.strict => Err(e),
            Err(e) => {
                warn!(
                    "⚠️ Progress store is unreadable, starting from an empty checkpoint \
                     (all prior work will be redone): {e}"
                );
                Ok(HashSet::new())
            }
        }
    }

    fn read_keys(&self) -> Result<HashSet<String>, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .map_err(|e| self.corrupt(e))?;

        let mut keys = HashSet::new();
        for record in reader.records() {
            let record = record.map_err(|e| self.corrupt(e))?;
            if let Some(code) = record.get(0) {
                keys.insert(code.to_string());
            }
        }
        debug!(
            "Checkpoint: {} completed ids in {}",
            keys.len(),
            self.path.display()
        );
        Ok(keys)
    }

    /// Durably append exactly one record, creating the file with its header
    /// row on first use. The sole write primitive.
    pub fn append(&self, record: &ProgressRecord) -> Result<(), AppError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io(e))?;
        let fresh = file.metadata().map_err(|e| self.io(e))?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if fresh {
            writer.write_record(HEADERS).map_err(|e| self.corrupt(e))?;
        }
        writer
            .write_record([&record.code, &record.x, &record.y])
            .map_err(|e| self.corrupt(e))?;
        writer.flush().map_err(|e| self.io(e))?;

        let file = writer
            .into_inner()
            .map_err(|e| self.io(e.into_error()))?;
        file.sync_all().map_err(|e| self.io(e))?;
        Ok(())
    }

    fn io(&self, source: std::io::Error) -> AppError {
        AppError::StoreIo {
            path: self.path.clone(),
            source,
        }
    }

    fn corrupt(&self, source: csv::Error) -> AppError {
        AppError::StoreCorrupt {
            path: self.path.clone(),
            source,
        }
    }
}
