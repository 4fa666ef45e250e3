use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::ProjectConfig;
use crate::model::project::Project;

/// Name of the config file marking a project root
pub const CONFIG_FILE: &str = "todo-actions.toml";

/// Error type for project loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Walk up from `start` looking for a directory containing todo-actions.toml.
pub fn discover_project(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).is_file() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Resolve the project for `start`.
///
/// Uses the nearest ancestor with a config file; without one, `start` is
/// the root and defaults apply.
pub fn load_project(start: &Path) -> Result<Project, ConfigError> {
    match discover_project(start) {
        Some(root) => {
            let config = read_config(&root.join(CONFIG_FILE))?;
            Ok(Project { root, config })
        }
        None => {
            tracing::debug!(start = %start.display(), "no {} found, using defaults", CONFIG_FILE);
            Ok(Project {
                root: start.to_path_buf(),
                config: ProjectConfig::default(),
            })
        }
    }
}

pub fn read_config(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_project(dir: &Path) {
        fs::write(
            dir.join(CONFIG_FILE),
            r#"
[tracker]
state_dir = ".tasks"
milestone = "v2"

[scan]
extensions = ["rs"]
"#,
        )
        .unwrap();
        fs::create_dir_all(dir.join("src/deep")).unwrap();
    }

    #[test]
    fn test_discover_project() {
        let tmp = TempDir::new().unwrap();
        create_test_project(tmp.path());

        assert_eq!(discover_project(tmp.path()).unwrap(), tmp.path());
        let sub = tmp.path().join("src/deep");
        assert_eq!(discover_project(&sub).unwrap(), tmp.path());
    }

    #[test]
    fn test_load_project() {
        let tmp = TempDir::new().unwrap();
        create_test_project(tmp.path());

        let project = load_project(&tmp.path().join("src")).unwrap();
        assert_eq!(project.root, tmp.path());
        assert_eq!(project.config.tracker.milestone.as_deref(), Some("v2"));
        assert_eq!(project.state_dir(), tmp.path().join(".tasks"));
        assert_eq!(project.ledger_path(), tmp.path().join(".tasks/tasks.json"));
    }

    #[test]
    fn test_load_project_without_config() {
        let tmp = TempDir::new().unwrap();
        let project = load_project(tmp.path()).unwrap();
        assert_eq!(project.root, tmp.path());
        assert_eq!(project.config, ProjectConfig::default());
    }

    #[test]
    fn test_bad_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[tracker\n").unwrap();
        let err = load_project(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
