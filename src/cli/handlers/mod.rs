use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::lock::WriterLock;
use crate::io::project_io;
use crate::io::source_io::{self, SourceError};
use crate::model::project::Project;
use crate::model::source::SourceFile;
use crate::ops::reference::apply_reference;
use crate::ops::sync::{self, SyncOptions, SyncReport};
use crate::ops::tracker::{LocalTracker, TaskTracker};
use crate::parse::parse_todos;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;

    let start = match cli.project_dir {
        Some(ref dir) => std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::List(args) => cmd_list(&start, args, json),
        Commands::Sync(args) => cmd_sync(&start, args, json),
        Commands::Ref(args) => cmd_ref(&start, args),
        Commands::Complete(args) => cmd_complete(&start, args),
        Commands::Tasks(args) => cmd_tasks(&start, args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve a user-supplied path against the start directory.
fn resolve_path(start: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        start.join(p)
    }
}

/// Load the sources named on the command line, or every source in the
/// project when none are given.
///
/// Explicitly named files must be readable. Files found by walking a
/// directory are skipped with a warning when they can't be read (binary
/// files, permissions).
fn load_sources(
    start: &Path,
    project: &Project,
    paths: &[String],
) -> Result<Vec<SourceFile>, SourceError> {
    let mut explicit = Vec::new();
    let mut walked = Vec::new();

    if paths.is_empty() {
        walked = source_io::discover_sources(&project.root, &project.config.scan);
    }
    for path in paths {
        let path = resolve_path(start, path);
        if path.is_dir() {
            walked.extend(source_io::discover_sources(&path, &project.config.scan));
        } else {
            explicit.push(path);
        }
    }

    let mut sources = Vec::new();
    for path in explicit {
        sources.push(source_io::read_source(&path)?);
    }
    for path in walked {
        match source_io::read_source(&path) {
            Ok(file) => sources.push(file),
            Err(e) => tracing::warn!("skipping {}: {}", path.display(), e),
        }
    }
    Ok(sources)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_list(start: &Path, args: ListArgs, json: bool) -> CmdResult {
    let project = project_io::load_project(start)?;
    let sources = load_sources(start, &project, &args.paths)?;

    let todos: Vec<_> = sources
        .iter()
        .flat_map(|f| parse_todos(f))
        .filter(|t| !args.untracked || t.reference().is_none())
        .collect();

    if json {
        let out: Vec<TodoJson> = todos
            .iter()
            .map(|t| todo_to_json(&project.root, t))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for todo in &todos {
            println!("{}", format_todo_line(&project.root, todo));
        }
    }
    Ok(())
}

fn cmd_sync(start: &Path, args: SyncArgs, json: bool) -> CmdResult {
    let project = project_io::load_project(start)?;
    let _lock = if args.dry_run {
        None
    } else {
        Some(WriterLock::acquire_default(&project.state_dir())?)
    };

    let mut tracker = LocalTracker::open(&project.ledger_path())?;
    let milestone = match args.milestone.or(project.config.tracker.milestone.clone()) {
        Some(name) => Some(tracker.resolve_milestone(&name)?),
        None => None,
    };
    let opts = SyncOptions {
        milestone,
        dry_run: args.dry_run,
    };

    let whole_project = args.paths.is_empty();
    let mut sources = load_sources(start, &project, &args.paths)?;
    let mut report = SyncReport::default();

    for file in &mut sources {
        sync::sync_source(file, &mut tracker, &opts, &mut report)?;
        if !opts.dry_run {
            // Ledger first, so every reference written to source exists in it
            tracker.save()?;
            source_io::save_source(file)?;
        }
    }

    if whole_project {
        sync::complete_missing(&mut tracker, &mut report, opts.dry_run)?;
    }
    if !opts.dry_run {
        tracker.save()?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for action in &report.actions {
            println!("{}", format_sync_action(&project.root, action, opts.dry_run));
        }
        for reference in &report.completed {
            let verb = if opts.dry_run { "would complete" } else { "completed" };
            println!("{} {}", verb, reference);
        }
        println!("{}", format_sync_summary(&report, opts.dry_run));
    }
    Ok(())
}

fn cmd_ref(start: &Path, args: RefArgs) -> CmdResult {
    let project = project_io::load_project(start)?;
    let _lock = WriterLock::acquire_default(&project.state_dir())?;

    let path = resolve_path(start, &args.file);
    let mut file = source_io::read_source(&path)?;
    let index = args
        .line
        .checked_sub(1)
        .ok_or("line numbers start at 1")?;

    let mut todo = parse_todos(&file)
        .into_iter()
        .find(|t| t.line() == index)
        .ok_or_else(|| {
            format!(
                "no annotation starts on line {} of {}",
                args.line,
                display_path(&project.root, &path)
            )
        })?;

    let reference = args.reference.as_deref().filter(|r| !r.is_empty());
    apply_reference(&mut file, &mut todo, reference)?;
    source_io::save_source(&mut file)?;

    let location = format!("{}:{}", display_path(&project.root, &path), args.line);
    match reference {
        Some(r) => println!("{} reference set to {}", location, r),
        None => println!("{} reference cleared", location),
    }
    Ok(())
}

fn cmd_complete(start: &Path, args: CompleteArgs) -> CmdResult {
    let project = project_io::load_project(start)?;
    let _lock = WriterLock::acquire_default(&project.state_dir())?;

    let mut tracker = LocalTracker::open(&project.ledger_path())?;
    tracker.complete_task(&args.reference)?;
    tracker.save()?;
    println!("{} completed", args.reference);
    Ok(())
}

fn cmd_tasks(start: &Path, args: TasksArgs, json: bool) -> CmdResult {
    let project = project_io::load_project(start)?;
    let tracker = LocalTracker::open(&project.ledger_path())?;

    let tasks: Vec<_> = tracker
        .ledger()
        .tasks
        .iter()
        .filter(|t| args.all || t.is_open())
        .collect();

    if json {
        let out: Vec<TaskJson> = tasks.iter().map(|t| task_to_json(t)).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for task in tasks {
            println!("{}", format_task_line(task));
        }
    }
    Ok(())
}
