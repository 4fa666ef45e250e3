use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::io::ledger_io::{self, LedgerError};
use crate::model::task::{
    Ledger, Milestone, TaskState, TrackedTask, format_reference, parse_reference,
};

/// What a tracker needs to file or refresh a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInformation {
    pub title: String,
    pub body: String,
    /// Milestone id from [`TaskTracker::resolve_milestone`]
    pub milestone: Option<String>,
}

/// Error type for tracker operations
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("invalid task reference: {0}")]
    InvalidReference(String),
    #[error("task not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// A task tracker that annotations are synchronized with.
///
/// References are opaque to callers; they are written into source verbatim.
pub trait TaskTracker {
    /// File a new task, returning its reference
    fn create_task(&mut self, info: &TaskInformation) -> Result<String, TrackerError>;

    /// Refresh title and body of an existing task
    fn update_task(&mut self, reference: &str, info: &TaskInformation)
    -> Result<(), TrackerError>;

    /// Mark a task done
    fn complete_task(&mut self, reference: &str) -> Result<(), TrackerError>;

    /// Look up a milestone id by name, creating the milestone if missing
    fn resolve_milestone(&mut self, name: &str) -> Result<String, TrackerError>;

    /// References of all tasks that are still open
    fn open_references(&self) -> Vec<String>;
}

/// Tracker backed by a JSON ledger on disk.
///
/// Changes are kept in memory until [`LocalTracker::save`].
#[derive(Debug)]
pub struct LocalTracker {
    path: PathBuf,
    ledger: Ledger,
    dirty: bool,
}

impl LocalTracker {
    pub fn open(path: &Path) -> Result<Self, TrackerError> {
        Ok(LocalTracker {
            path: path.to_path_buf(),
            ledger: ledger_io::load_ledger(path)?,
            dirty: false,
        })
    }

    /// Write the ledger if anything changed
    pub fn save(&mut self) -> Result<(), TrackerError> {
        if self.dirty {
            ledger_io::save_ledger(&self.path, &self.ledger)?;
            self.dirty = false;
            tracing::debug!(path = %self.path.display(), "ledger saved");
        }
        Ok(())
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn task_mut(&mut self, reference: &str) -> Result<&mut TrackedTask, TrackerError> {
        let number = parse_reference(reference)
            .ok_or_else(|| TrackerError::InvalidReference(reference.to_string()))?;
        self.ledger
            .find_mut(number)
            .ok_or_else(|| TrackerError::NotFound(reference.to_string()))
    }
}

impl TaskTracker for LocalTracker {
    fn create_task(&mut self, info: &TaskInformation) -> Result<String, TrackerError> {
        let now = Utc::now();
        let number = self.ledger.next_number;
        self.ledger.next_number += 1;
        self.ledger.tasks.push(TrackedTask {
            number,
            title: info.title.clone(),
            body: info.body.clone(),
            state: TaskState::Open,
            milestone: info.milestone.clone(),
            created_at: now,
            updated_at: now,
        });
        self.dirty = true;

        let reference = format_reference(number);
        tracing::info!(reference = %reference, title = %info.title, "task created");
        Ok(reference)
    }

    fn update_task(
        &mut self,
        reference: &str,
        info: &TaskInformation,
    ) -> Result<(), TrackerError> {
        let task = self.task_mut(reference)?;
        if task.title == info.title && task.body == info.body {
            return Ok(());
        }
        task.title = info.title.clone();
        task.body = info.body.clone();
        task.updated_at = Utc::now();
        self.dirty = true;
        tracing::info!(reference, "task updated");
        Ok(())
    }

    fn complete_task(&mut self, reference: &str) -> Result<(), TrackerError> {
        let task = self.task_mut(reference)?;
        if task.state == TaskState::Completed {
            return Ok(());
        }
        task.state = TaskState::Completed;
        task.updated_at = Utc::now();
        self.dirty = true;
        tracing::info!(reference, "task completed");
        Ok(())
    }

    fn resolve_milestone(&mut self, name: &str) -> Result<String, TrackerError> {
        if let Some(m) = self.ledger.milestones.iter().find(|m| m.title == name) {
            return Ok(m.id.clone());
        }
        let id = format!("M{}", self.ledger.milestones.len() + 1);
        self.ledger.milestones.push(Milestone {
            id: id.clone(),
            title: name.to_string(),
        });
        self.dirty = true;
        tracing::info!(milestone = name, id = %id, "milestone created");
        Ok(id)
    }

    fn open_references(&self) -> Vec<String> {
        self.ledger
            .tasks
            .iter()
            .filter(|t| t.is_open())
            .map(|t| t.reference())
            .collect()
    }
}
