//! Command parser for the interactive dashboard
//!
//! Input lines are a command word followed by at most one argument.
//! Command words are case-insensitive; arguments (paths) keep their case.

use std::path::PathBuf;

use thiserror::Error;

use crate::api::DatasetId;

/// Errors that can occur when parsing dashboard commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType 'help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },

    /// Argument could not be interpreted
    #[error("Invalid argument for {command}: {arg}")]
    InvalidArgument { command: String, arg: String },
}

/// Commands accepted by the dashboard loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardCommand {
    /// Reload and print the dataset list
    List,
    /// Select a dataset and show its statistics
    Select(DatasetId),
    /// Re-fetch and show statistics for the selection
    Stats,
    /// Choose a CSV file and upload it
    Upload(PathBuf),
    /// Upload the file already chosen, e.g. after a failed attempt
    Submit,
    /// Drop the pending upload candidate
    Remove,
    /// Show the upload control
    UploadStatus,
    /// Download the report of the selection
    Report(Option<PathBuf>),
    /// End the session
    Logout,
    /// Show help
    Help,
    /// Leave the dashboard
    Exit,
    /// Empty input
    None,
}

/// Parse one input line.
///
/// # Errors
///
/// Returns [`CommandError`] for unknown commands, missing arguments or a
/// non-numeric dataset id.
///
/// # Examples
///
/// ```
/// use equipviz::commands::dashboard_commands::{parse_dashboard_command, DashboardCommand};
///
/// assert_eq!(parse_dashboard_command("select 4").unwrap(), DashboardCommand::Select(4));
/// assert_eq!(parse_dashboard_command("  ").unwrap(), DashboardCommand::None);
/// ```
pub fn parse_dashboard_command(input: &str) -> Result<DashboardCommand, CommandError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(DashboardCommand::None);
    }

    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (trimmed, ""),
    };
    let arg = (!rest.is_empty()).then_some(rest);

    match word.to_lowercase().as_str() {
        "list" | "ls" | "datasets" => Ok(DashboardCommand::List),
        "select" | "use" => {
            let arg = arg.ok_or_else(|| CommandError::MissingArgument {
                command: "select".to_string(),
                usage: "select <id>".to_string(),
            })?;
            arg.parse()
                .map(DashboardCommand::Select)
                .map_err(|_| CommandError::InvalidArgument {
                    command: "select".to_string(),
                    arg: arg.to_string(),
                })
        }
        "stats" | "show" => Ok(DashboardCommand::Stats),
        "upload" => arg
            .map(|path| DashboardCommand::Upload(PathBuf::from(path)))
            .ok_or_else(|| CommandError::MissingArgument {
                command: "upload".to_string(),
                usage: "upload <file.csv>".to_string(),
            }),
        "submit" | "retry" => Ok(DashboardCommand::Submit),
        "remove" | "rm" => Ok(DashboardCommand::Remove),
        "file" => Ok(DashboardCommand::UploadStatus),
        "report" => Ok(DashboardCommand::Report(arg.map(PathBuf::from))),
        "logout" => Ok(DashboardCommand::Logout),
        "help" | "?" => Ok(DashboardCommand::Help),
        "quit" | "exit" | "q" => Ok(DashboardCommand::Exit),
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Print the dashboard command reference.
pub fn print_help() {
    println!(
        r#"
Dashboard Commands
==================

DATASETS:
  list             - Reload and show your recent datasets
  select <id>      - Select a dataset and show its statistics
  stats            - Refresh statistics for the selected dataset
  report [dir]     - Download the PDF report of the selected dataset

UPLOAD:
  upload <file>    - Upload an equipment CSV file
  retry            - Upload the chosen file again after a failure
  file             - Show the upload control
  remove           - Drop the chosen file

SESSION:
  logout           - Log out and leave the dashboard
  help             - Show this help
  quit             - Leave the dashboard (session is kept)
"#
    );
}
