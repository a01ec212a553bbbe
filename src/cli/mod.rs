//! Command-line driver for the task and project stores.
//!
//! Each command opens the workspace, performs one operation the way a
//! screen would, and reports the result. Parsing lives here; execution is in
//! [`run`] so it can be tested without a process.

mod run;


pub use run::{run, CliOutput};

use crate::views::ALL;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// GTD task manager - capture, process and complete tasks.
///
/// Tasks start in the inbox. Processing a task gives it a context and a
/// project and moves it to the next-actions list.
///
/// ## Quick Start
///
/// ```bash
/// gtd add "Buy milk"
/// gtd inbox
/// gtd process <id> --context home --project personal
/// gtd next --context home
/// gtd done <id>
/// ```
#[derive(Parser, Debug)]
#[command(name = "gtd")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to $GTD_DATA_DIR or ~/.gtd-core)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Capture a task into the inbox.
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List inbox tasks, newest first.
    Inbox,

    /// Move an inbox task to next actions.
    ///
    /// Both a context and a project are required. The project may be given
    /// by ID or by name.
    Process {
        /// Task ID
        id: String,

        /// Context such as home, work, computer or errands
        #[arg(short, long)]
        context: Option<String>,

        /// Project ID or name
        #[arg(short, long)]
        project: Option<String>,
    },

    /// List next actions, optionally filtered.
    Next {
        /// Context filter ("all" for every context)
        #[arg(short, long, default_value = ALL)]
        context: String,

        /// Project filter by ID ("all" for every project)
        #[arg(short, long, default_value = ALL)]
        project: String,
    },

    /// Mark a task done.
    Done {
        /// Task ID
        id: String,
    },

    /// Delete a task.
    Delete {
        /// Task ID
        id: String,
    },

    /// Delete every task.
    Clear,

    /// List projects.
    Projects,

    /// Create a project.
    #[command(name = "add-project")]
    AddProject {
        /// Project name
        name: String,
    },

    /// Delete a project. Tasks referring to it keep the dangling reference.
    #[command(name = "delete-project")]
    DeleteProject {
        /// Project ID
        id: String,
    },

    /// Show task counts per status.
    Status,

    /// Show version information.
    Version,
}

impl Command {
    /// Returns true if this command reads or writes stored state.
    #[must_use]
    pub const fn needs_workspace(&self) -> bool {
        !matches!(self, Self::Version)
    }

    /// Returns true if this command changes stored state.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Add { .. }
                | Self::Process { .. }
                | Self::Done { .. }
                | Self::Delete { .. }
                | Self::Clear
                | Self::AddProject { .. }
                | Self::DeleteProject { .. }
        )
    }
}
