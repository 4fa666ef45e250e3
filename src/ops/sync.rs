use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::model::source::LineStore;
use crate::model::todo::Todo;
use crate::ops::reference::{ReferenceError, apply_reference};
use crate::ops::tracker::{TaskInformation, TaskTracker, TrackerError};
use crate::parse::parse_todos;

/// Error type for sync operations
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

/// Options controlling a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Milestone id new tasks are filed under
    pub milestone: Option<String>,
    /// Report what would change without touching the tracker or sources
    pub dry_run: bool,
}

/// What happened to one annotation during sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SyncAction {
    /// A task was filed and its reference written into source.
    /// In a dry run, `reference` is `None`.
    Created {
        file: PathBuf,
        line: usize,
        title: String,
        reference: Option<String>,
    },
    /// An existing task was refreshed from the annotation
    Updated {
        file: PathBuf,
        line: usize,
        reference: String,
    },
    /// The annotation carries a reference this tracker does not issue
    Skipped {
        file: PathBuf,
        line: usize,
        reference: String,
    },
}

/// Result of syncing one or more sources
#[derive(Debug, Default, Serialize)]
pub struct SyncReport {
    pub actions: Vec<SyncAction>,
    /// Every reference found in the scanned sources
    #[serde(skip)]
    pub seen: BTreeSet<String>,
    /// References completed because their annotation disappeared
    pub completed: Vec<String>,
}

impl SyncReport {
    pub fn created(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, SyncAction::Created { .. }))
            .count()
    }

    pub fn updated(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, SyncAction::Updated { .. }))
            .count()
    }
}

fn task_information(todo: &Todo, milestone: Option<&str>) -> TaskInformation {
    TaskInformation {
        title: todo.title().to_string(),
        body: todo.body().to_string(),
        milestone: milestone.map(|m| m.to_string()),
    }
}

/// Synchronize every annotation in `store` with `tracker`.
///
/// Annotations without a reference get a new task and the returned
/// reference is written back into the store. Annotations with a reference
/// refresh that task's title and body.
pub fn sync_source<S, T>(
    store: &mut S,
    tracker: &mut T,
    opts: &SyncOptions,
    report: &mut SyncReport,
) -> Result<(), SyncError>
where
    S: LineStore + ?Sized,
    T: TaskTracker + ?Sized,
{
    let todos = parse_todos(&*store);
    tracing::debug!(file = %store.path().display(), count = todos.len(), "syncing annotations");

    for mut todo in todos {
        let info = task_information(&todo, opts.milestone.as_deref());
        match todo.reference().map(|r| r.to_string()) {
            None => {
                let reference = if opts.dry_run {
                    None
                } else {
                    let reference = tracker.create_task(&info)?;
                    apply_reference(store, &mut todo, Some(&reference))?;
                    report.seen.insert(reference.clone());
                    Some(reference)
                };
                report.actions.push(SyncAction::Created {
                    file: todo.file().to_path_buf(),
                    line: todo.line(),
                    title: info.title,
                    reference,
                });
            }
            Some(reference) => {
                if !opts.dry_run {
                    match tracker.update_task(&reference, &info) {
                        Ok(()) => {}
                        Err(TrackerError::InvalidReference(_)) => {
                            tracing::warn!(
                                file = %todo.file().display(),
                                line = todo.line() + 1,
                                reference = %reference,
                                "skipping annotation with a foreign reference"
                            );
                            report.actions.push(SyncAction::Skipped {
                                file: todo.file().to_path_buf(),
                                line: todo.line(),
                                reference,
                            });
                            continue;
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                report.seen.insert(reference.clone());
                report.actions.push(SyncAction::Updated {
                    file: todo.file().to_path_buf(),
                    line: todo.line(),
                    reference,
                });
            }
        }
    }
    Ok(())
}

/// Complete every open task whose reference was not seen in any source.
///
/// Only meaningful after every source of the project has been synced.
pub fn complete_missing<T: TaskTracker + ?Sized>(
    tracker: &mut T,
    report: &mut SyncReport,
    dry_run: bool,
) -> Result<(), SyncError> {
    for reference in tracker.open_references() {
        if report.seen.contains(&reference) {
            continue;
        }
        if !dry_run {
            tracker.complete_task(&reference)?;
        }
        report.completed.push(reference);
    }
    Ok(())
}
