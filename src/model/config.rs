use serde::{Deserialize, Serialize};

/// Configuration from todo-actions.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Directory (relative to the project root) holding the lock and ledger
    #[serde(default = "default_state_dir")]
    pub state_dir: String,
    /// Ledger file name, relative to `state_dir`
    #[serde(default = "default_ledger")]
    pub ledger: String,
    /// Milestone new tasks are filed under
    #[serde(default)]
    pub milestone: Option<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            state_dir: default_state_dir(),
            ledger: default_ledger(),
            milestone: None,
        }
    }
}

fn default_state_dir() -> String {
    ".todo-actions".to_string()
}

fn default_ledger() -> String {
    "tasks.json".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// File extensions to scan (without the dot). Empty means every file.
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Directory names skipped while walking
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            extensions: Vec::new(),
            exclude: default_exclude(),
        }
    }
}

fn default_exclude() -> Vec<String> {
    [".git", ".todo-actions", "target", "node_modules"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
