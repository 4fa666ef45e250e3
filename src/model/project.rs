use std::path::PathBuf;

use super::config::ProjectConfig;

/// A resolved todo-actions project
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (where todo-actions.toml lives, if any)
    pub root: PathBuf,
    /// Parsed todo-actions.toml, or defaults
    pub config: ProjectConfig,
}

impl Project {
    /// Directory holding the lock file and ledger
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(&self.config.tracker.state_dir)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.state_dir().join(&self.config.tracker.ledger)
    }
}
