//! Command execution for the CLI.
//!
//! This module handles running CLI commands and producing output.

use crate::cli::Command;
use crate::projects::ProjectStore;
use crate::tasks::{Status, Task};
use crate::views::{self, CaughtUpTracker, NextView, ProcessingDrafts, Selection};
use crate::workspace::Workspace;
use serde::Serialize;
use std::process::ExitCode;

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

/// Run a CLI command against an open workspace.
///
/// Mutating commands flush the workspace afterwards; a failed write is
/// reported on stderr but does not change the exit code, since the
/// in-memory operation succeeded.
pub fn run(command: Command, workspace: &mut Workspace) -> CliOutput {
    let mutates = command.is_mutation();

    let mut output = match command {
        Command::Version => run_version(),
        Command::Add { title, description } => run_add(workspace, &title, description.as_deref()),
        Command::Inbox => run_inbox(workspace),
        Command::Process { id, context, project } => {
            run_process(workspace, &id, context.as_deref(), project.as_deref())
        }
        Command::Next { context, project } => run_next(workspace, &context, &project),
        Command::Done { id } => run_done(workspace, &id),
        Command::Delete { id } => run_delete(workspace, &id),
        Command::Clear => run_clear(workspace),
        Command::Projects => run_projects(workspace),
        Command::AddProject { name } => run_add_project(workspace, &name),
        Command::DeleteProject { id } => run_delete_project(workspace, &id),
        Command::Status => run_status(workspace),
    };

    if mutates {
        if let Err(e) = workspace.flush() {
            output.stderr.push(format!("Warning: changes not saved: {e}"));
        }
    }

    output
}

// === Utility Commands ===

fn run_version() -> CliOutput {
    CliOutput {
        exit_code: ExitCode::SUCCESS,
        stdout: vec![],
        stderr: vec![format!("gtd v{}", crate::VERSION)],
    }
}

// === Task Commands ===

fn run_add(workspace: &mut Workspace, title: &str, description: Option<&str>) -> CliOutput {
    match workspace.tasks_mut().add_task(title, description) {
        Ok(task) => json_output(&task),
        Err(e) => error_output(e.to_string()),
    }
}

fn run_inbox(workspace: &Workspace) -> CliOutput {
    json_output(&views::tasks_by_status(workspace.tasks().tasks(), Status::Inbox))
}

fn run_process(
    workspace: &mut Workspace,
    id: &str,
    context: Option<&str>,
    project: Option<&str>,
) -> CliOutput {
    let (tasks, projects) = workspace.split_mut();
    let mut drafts = ProcessingDrafts::new();

    if let Some(context) = context {
        drafts.select_context(id, context);
    }
    if let Some(project) = project {
        match lookup_project(projects, project) {
            Some(project_id) => drafts.select_project(id, &project_id),
            None => return error_output(format!("unknown project: {project}")),
        }
    }

    match drafts.process(tasks, id) {
        Ok(task) => json_output(&task),
        Err(e) => error_output(e.to_string()),
    }
}

/// Resolve a project argument given by ID or, failing that, by name.
fn lookup_project(projects: &ProjectStore, value: &str) -> Option<String> {
    projects
        .get_project(value)
        .or_else(|| projects.find_by_name(value))
        .map(|p| p.id.clone())
}

fn run_next(workspace: &Workspace, context: &str, project: &str) -> CliOutput {
    let tasks = workspace.tasks().tasks();
    let context = Selection::parse(context);
    let project = Selection::parse(project);

    // Each invocation is a fresh process, so history comes from the stored tasks.
    let mut tracker = CaughtUpTracker::with_history(views::has_next_history(tasks));
    match tracker.observe(tasks, &context, &project) {
        NextView::Pending(_) => json_output(&views::filter_next(tasks, &context, &project)),
        NextView::CaughtUp => success_output("All caught up!".to_string()),
        NextView::Empty => success_output("No next actions.".to_string()),
    }
}

fn run_done(workspace: &mut Workspace, id: &str) -> CliOutput {
    match views::mark_done(workspace.tasks_mut(), id) {
        Some(task) => json_output(&task),
        None => error_output(format!("task not found: {id}")),
    }
}

fn run_delete(workspace: &mut Workspace, id: &str) -> CliOutput {
    if workspace.tasks_mut().delete_task(id) {
        success_output(format!("Deleted task {id}"))
    } else {
        error_output(format!("task not found: {id}"))
    }
}

fn run_clear(workspace: &mut Workspace) -> CliOutput {
    let removed = workspace.tasks_mut().clear_tasks();
    success_output(format!("Deleted {removed} task(s)"))
}

// === Project Commands ===

fn run_projects(workspace: &Workspace) -> CliOutput {
    json_output(&workspace.projects().projects())
}

fn run_add_project(workspace: &mut Workspace, name: &str) -> CliOutput {
    match workspace.projects_mut().add_project(name) {
        Ok(project) => json_output(&project),
        Err(e) => error_output(e.to_string()),
    }
}

fn run_delete_project(workspace: &mut Workspace, id: &str) -> CliOutput {
    let dangling_before = dangling_count(workspace);
    let removed = workspace.projects_mut().delete_project(id);
    let orphaned = dangling_count(workspace) - dangling_before;

    let mut output = if removed {
        success_output(format!("Deleted project {id}"))
    } else {
        success_output(format!("No project {id}"))
    };
    if orphaned > 0 {
        output.stderr.push(format!("{orphaned} task(s) now refer to a deleted project"));
    }
    output
}

fn dangling_count(workspace: &Workspace) -> usize {
    views::dangling_tasks(workspace.tasks().tasks(), workspace.projects().projects()).len()
}

// === Status ===

#[derive(Serialize)]
struct StatusOutput {
    inbox: usize,
    next: usize,
    project: usize,
    done: usize,
    total: usize,
    projects: usize,
    dangling: usize,
}

fn run_status(workspace: &Workspace) -> CliOutput {
    let tasks: &[Task] = workspace.tasks().tasks();
    let counts = views::counts_by_status(tasks);
    json_output(&StatusOutput {
        inbox: counts.inbox,
        next: counts.next,
        project: counts.project,
        done: counts.done,
        total: counts.total(),
        projects: workspace.projects().len(),
        dangling: dangling_count(workspace),
    })
}

// === Helpers ===

fn json_output<T: Serialize + ?Sized>(value: &T) -> CliOutput {
    match serde_json::to_string_pretty(value) {
        Ok(json) => CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![json], stderr: vec![] },
        Err(e) => error_output(e.to_string()),
    }
}

fn success_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![message], stderr: vec![] }
}

fn error_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::from(1), stdout: vec![], stderr: vec![message] }
}
