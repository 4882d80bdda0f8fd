//! Error taxonomy for the harvester.
//!
//! Only conditions the run controller has to classify get a variant here.
//! Per-item failures never appear in this module: a failed lookup is a value
//! (`session::Outcome`), not an error.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal-capable application errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The id list file could not be read.
    #[error("cannot read id list {path}: {source}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The id list file exists but is not a usable table.
    #[error("cannot parse id list {path}: {source}")]
    InputUnparsable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// I/O failure against the progress store.
    #[error("progress store {path}: {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The progress store exists but could not be parsed.
    ///
    /// Only surfaced as an error under `strict_checkpoint`; the default
    /// policy degrades to an empty checkpoint instead.
    #[error("progress store {path} is corrupt: {source}")]
    StoreCorrupt {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, AppError>;
