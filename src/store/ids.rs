//! Candidate id list.
//!
//! One cadastral identifier per row, single column, no header row. Entries
//! are trimmed and kept in file order; sentinel filtering happens later in
//! the planner, not here.

use std::path::Path;

use tracing::{info, warn};

use crate::error::AppError;

/// Seed id written into a synthesized list so a fresh setup has a working
/// example to replace.
const PLACEHOLDER_ID: &str = "68134.4083.606";

/// Load the full candidate list.
///
/// A missing file is a fatal `Config` condition when `fail_on_missing` is
/// set; otherwise a placeholder list is created on disk and returned, so a
/// first run on an empty machine leaves something to fill in.
pub fn load_ids(path: &str, fail_on_missing: bool) -> Result<Vec<String>, AppError> {
    if !Path::new(path).exists() {
        if fail_on_missing {
            return Err(AppError::Config(format!("id list {path} does not exist")));
        }
        warn!("⚠️ Id list {path} is missing, creating a placeholder list");
        return synthesize_placeholder(path);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| map_csv_open_error(path, e))?;

    let mut ids = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AppError::InputUnparsable {
            path: path.into(),
            source: e,
        })?;
        let id = record.get(0).unwrap_or("").trim().to_string();
        ids.push(id);
    }

    info!("📋 Loaded {} ids from {}", ids.len(), path);
    Ok(ids)
}

fn synthesize_placeholder(path: &str) -> Result<Vec<String>, AppError> {
    std::fs::write(path, format!("{PLACEHOLDER_ID}\n")).map_err(|e| AppError::InputUnreadable {
        path: path.into(),
        source: e,
    })?;
    Ok(vec![PLACEHOLDER_ID.to_string()])
}

fn map_csv_open_error(path: &str, e: csv::Error) -> AppError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => AppError::InputUnreadable {
            path: path.into(),
            source: io,
        },
        other => AppError::Config(format!("cannot open id list {path}: {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_list(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn loads_trimmed_ids_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_list(&dir, "ids.csv", "  68134.4083.606 \n1234.5\nКИ\n");
        let ids = load_ids(&path, true).unwrap();
        assert_eq!(ids, vec!["68134.4083.606", "1234.5", "КИ"]);
    }

    #[test]
    fn missing_list_fails_hard_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        let result = load_ids(path.to_str().unwrap(), true);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn missing_list_is_synthesized_when_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        let ids = load_ids(path.to_str().unwrap(), false).unwrap();
        assert_eq!(ids, vec![PLACEHOLDER_ID.to_string()]);
        assert!(path.exists());
    }
}
