//! Tabular input and output.
//!
//! - `ids`: the candidate id list (read once per run)
//! - `progress`: the append-only result store, doubling as the checkpoint

pub mod ids;
pub mod progress;

pub use progress::{ProgressRecord, ProgressStore};
