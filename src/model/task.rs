use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a tracked task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Open,
    Completed,
}

/// A task held by the local tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedTask {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub state: TaskState,
    /// Milestone id, if the task was filed under one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrackedTask {
    /// The reference written into source for this task, e.g. `#12`
    pub fn reference(&self) -> String {
        format_reference(self.number)
    }

    pub fn is_open(&self) -> bool {
        self.state == TaskState::Open
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub title: String,
}

/// Everything the local tracker persists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    pub next_number: u64,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub tasks: Vec<TrackedTask>,
}

impl Default for Ledger {
    fn default() -> Self {
        Ledger {
            next_number: 1,
            milestones: Vec::new(),
            tasks: Vec::new(),
        }
    }
}

impl Ledger {
    pub fn find_mut(&mut self, number: u64) -> Option<&mut TrackedTask> {
        self.tasks.iter_mut().find(|t| t.number == number)
    }
}

pub fn format_reference(number: u64) -> String {
    format!("#{}", number)
}

/// Parse a `#N` reference into its task number
pub fn parse_reference(reference: &str) -> Option<u64> {
    reference.strip_prefix('#')?.parse().ok()
}
