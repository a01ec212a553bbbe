//! CLI binary for `gtd_core`.
//!
//! This binary is a thin wrapper that opens the workspace and delegates to the library.

use std::process::ExitCode;

use clap::Parser;
use gtd_core::cli::{run, Cli};
use gtd_core::{paths, Workspace};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut workspace = if cli.command.needs_workspace() {
        let Some(data_dir) = cli.data_dir.or_else(paths::data_dir) else {
            eprintln!("Error: cannot determine data directory; set {}", paths::DATA_DIR_ENV);
            return ExitCode::from(1);
        };
        match Workspace::from_config_dir(&data_dir) {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("Error opening {}: {e}", data_dir.display());
                return ExitCode::from(1);
            }
        }
    } else {
        Workspace::in_memory()
    };

    let output = run(cli.command, &mut workspace);

    for msg in output.stdout {
        println!("{msg}");
    }
    for msg in output.stderr {
        eprintln!("{msg}");
    }

    output.exit_code
}
