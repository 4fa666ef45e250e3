use std::fs;
use std::path::{Path, PathBuf};

use crate::io::source_io::atomic_write;
use crate::model::task::Ledger;

/// Error type for ledger persistence
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse ledger {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not serialize ledger: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Load the ledger, or an empty one if the file does not exist yet.
pub fn load_ledger(path: &Path) -> Result<Ledger, LedgerError> {
    if !path.exists() {
        return Ok(Ledger::default());
    }
    let text = fs::read_to_string(path).map_err(|e| LedgerError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| LedgerError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn save_ledger(path: &Path, ledger: &Ledger) -> Result<(), LedgerError> {
    let mut content = serde_json::to_string_pretty(ledger)?;
    content.push('\n');
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| LedgerError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    atomic_write(path, content.as_bytes()).map_err(|e| LedgerError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{Milestone, TaskState, TrackedTask};
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_missing_ledger_is_empty() {
        let tmp = TempDir::new().unwrap();
        let ledger = load_ledger(&tmp.path().join("tasks.json")).unwrap();
        assert_eq!(ledger, Ledger::default());
    }

    #[test]
    fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state/tasks.json");
        let now = Utc::now();
        let ledger = Ledger {
            next_number: 2,
            milestones: vec![Milestone {
                id: "M1".to_string(),
                title: "v1.0".to_string(),
            }],
            tasks: vec![TrackedTask {
                number: 1,
                title: "fix this".to_string(),
                body: "line one\nline two".to_string(),
                state: TaskState::Open,
                milestone: Some("M1".to_string()),
                created_at: now,
                updated_at: now,
            }],
        };

        save_ledger(&path, &ledger).unwrap();
        assert_eq!(load_ledger(&path).unwrap(), ledger);
    }

    #[test]
    fn test_corrupt_ledger() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tasks.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_ledger(&path),
            Err(LedgerError::ParseError { .. })
        ));
    }
}
