use std::io;
use std::process::ExitCode;

use tracing::error;

use super::bootstrap::AppWiring;
use super::commands::run_command;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    if let Err(err) = run_command(&app.command, &app.options, &mut io::stdout()) {
        error!(error = %err, "command_failed");
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
