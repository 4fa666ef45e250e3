use std::path::Path;

use serde::Serialize;

use crate::model::task::{TaskState, TrackedTask};
use crate::model::todo::{Keyword, Todo};
use crate::ops::sync::{SyncAction, SyncReport};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TodoJson {
    pub file: String,
    /// 1-based marker line
    pub line: usize,
    pub keyword: Keyword,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
}

#[derive(Serialize)]
pub struct TaskJson {
    pub reference: String,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
    pub state: TaskState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Show paths relative to the project root when possible
pub fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

pub fn todo_to_json(root: &Path, todo: &Todo) -> TodoJson {
    TodoJson {
        file: display_path(root, todo.file()),
        line: todo.line() + 1,
        keyword: todo.keyword(),
        reference: todo.reference().map(|r| r.to_string()),
        title: todo.title().to_string(),
        body: todo.body().to_string(),
    }
}

pub fn task_to_json(task: &TrackedTask) -> TaskJson {
    TaskJson {
        reference: task.reference(),
        title: task.title.clone(),
        body: task.body.clone(),
        state: task.state,
        milestone: task.milestone.clone(),
        created_at: task.created_at.to_rfc3339(),
        updated_at: task.updated_at.to_rfc3339(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// `path:LINE: [ref] title`
pub fn format_todo_line(root: &Path, todo: &Todo) -> String {
    let location = format!("{}:{}", display_path(root, todo.file()), todo.line() + 1);
    match todo.reference() {
        Some(r) => format!("{}: [{}] {}", location, r, todo.title()),
        None => format!("{}: {}", location, todo.title()),
    }
}

pub fn format_task_line(task: &TrackedTask) -> String {
    let mark = match task.state {
        TaskState::Open => ' ',
        TaskState::Completed => 'x',
    };
    format!("[{}] {} {}", mark, task.reference(), task.title)
}

pub fn format_sync_action(root: &Path, action: &SyncAction, dry_run: bool) -> String {
    match action {
        SyncAction::Created {
            file,
            line,
            title,
            reference,
        } => {
            let location = format!("{}:{}", display_path(root, file), line + 1);
            match reference {
                Some(r) => format!("created {} {}: {}", r, location, title),
                None if dry_run => format!("would create {}: {}", location, title),
                None => format!("created {}: {}", location, title),
            }
        }
        SyncAction::Updated {
            file,
            line,
            reference,
        } => format!(
            "synced {} {}:{}",
            reference,
            display_path(root, file),
            line + 1
        ),
        SyncAction::Skipped {
            file,
            line,
            reference,
        } => format!(
            "skipped {} {}:{} (not a local task)",
            reference,
            display_path(root, file),
            line + 1
        ),
    }
}

pub fn format_sync_summary(report: &SyncReport, dry_run: bool) -> String {
    let verb = if dry_run { "would be " } else { "" };
    format!(
        "{} {}created, {} {}synced, {} {}completed",
        report.created(),
        verb,
        report.updated(),
        verb,
        report.completed.len(),
        verb,
    )
}
