use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "todo-actions", about = concat!("todo-actions v", env!("CARGO_PKG_VERSION"), " - TODO comments in, tracked tasks out"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different project directory
    #[arg(short = 'C', long = "project-dir", global = true)]
    pub project_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List TODO / FIXME annotations
    List(ListArgs),
    /// File tasks for new annotations and write their references back
    Sync(SyncArgs),
    /// Set or clear the reference of one annotation
    Ref(RefArgs),
    /// Mark a task complete
    Complete(CompleteArgs),
    /// List tracked tasks
    Tasks(TasksArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Files or directories to scan (default: the whole project)
    pub paths: Vec<String>,
    /// Only show annotations without a reference
    #[arg(long)]
    pub untracked: bool,
}

#[derive(Args)]
pub struct SyncArgs {
    /// Files or directories to sync (default: the whole project).
    /// Tasks are only auto-completed when the whole project is synced.
    pub paths: Vec<String>,
    /// Show what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,
    /// File new tasks under this milestone (overrides config)
    #[arg(long)]
    pub milestone: Option<String>,
}

#[derive(Args)]
pub struct RefArgs {
    /// Source file containing the annotation
    pub file: String,
    /// Line number of the annotation's marker line (1-based)
    pub line: usize,
    /// New reference; omit to clear it
    pub reference: Option<String>,
}

#[derive(Args)]
pub struct CompleteArgs {
    /// Task reference, e.g. `#12`
    pub reference: String,
}

#[derive(Args)]
pub struct TasksArgs {
    /// Include completed tasks
    #[arg(long)]
    pub all: bool,
}
