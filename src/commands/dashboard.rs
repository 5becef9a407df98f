//! Interactive dashboard
//!
//! A readline loop over one [`Dashboard`]: the session is restored once, and
//! every command runs against the same registry, analytics and upload state,
//! so selection, the upload success display and the 401 teardown behave as
//! they would in a long-lived client.

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::analytics::AnalyticsState;
use crate::commands::dashboard_commands::{parse_dashboard_command, print_help, DashboardCommand};
use crate::commands::{build_dashboard, render};
use crate::config::Config;
use crate::dashboard::{Dashboard, DashboardEvent, LogoutReason, SubmitOutcome};
use crate::error::{EquipvizError, Result};
use crate::upload::FileSource;

/// What the loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Start the interactive dashboard
///
/// # Errors
///
/// Returns [`EquipvizError::NotAuthenticated`] if no credential is stored.
/// Command failures inside the loop are printed and the loop continues.
pub async fn run_dashboard(config: Config) -> Result<()> {
    let dashboard = build_dashboard(&config)?;
    let mut events = dashboard.subscribe();

    if !dashboard.start().await? {
        return Err(EquipvizError::NotAuthenticated.into());
    }

    print_welcome_banner(&config);
    announce_events(&mut events);
    show_registry(&dashboard);
    show_stats(&dashboard);

    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline("equipviz> ") {
            Ok(line) => {
                let command = match parse_dashboard_command(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("{}\n", e);
                        continue;
                    }
                };
                if command == DashboardCommand::None {
                    continue;
                }
                rl.add_history_entry(line.trim())?;

                let flow = match handle_command(&dashboard, &config, command).await {
                    Ok(flow) => flow,
                    Err(e) => {
                        eprintln!("{} {}\n", "Error:".red(), e);
                        Flow::Continue
                    }
                };

                announce_events(&mut events);

                if flow == Flow::Exit {
                    break;
                }
                if !dashboard.session().is_authenticated() {
                    println!("Run `equipviz login` to start a new session.");
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

async fn handle_command(
    dashboard: &Dashboard,
    config: &Config,
    command: DashboardCommand,
) -> Result<Flow> {
    match command {
        DashboardCommand::List => {
            dashboard.reload().await?;
            show_registry(dashboard);
        }
        DashboardCommand::Select(id) => {
            if !dashboard.registry().contains(id) {
                println!("{}", format!("Dataset {} not found", id).yellow());
                return Ok(Flow::Continue);
            }
            dashboard.select(id).await?;
            show_stats(dashboard);
        }
        DashboardCommand::Stats => match dashboard.refresh_stats().await? {
            Some(_) => show_stats(dashboard),
            None => println!("{}", "No dataset selected".yellow()),
        },
        DashboardCommand::Upload(path) => {
            dashboard.choose_file(path, FileSource::Picker)?;
            let outcome = dashboard.submit_upload().await?;
            show_submit_outcome(dashboard, outcome);
        }
        DashboardCommand::Submit => {
            let outcome = dashboard.submit_upload().await?;
            show_submit_outcome(dashboard, outcome);
        }
        DashboardCommand::Remove => {
            if dashboard.remove_file() {
                println!("Upload control cleared");
            } else {
                println!("{}", "Nothing to remove".yellow());
            }
        }
        DashboardCommand::UploadStatus => {
            println!("{}", render::upload_status_line(&dashboard.upload()));
        }
        DashboardCommand::Report(dir) => {
            let dir = dir.unwrap_or_else(|| config.report.output_path());
            let path = dashboard.download_report(&dir).await?;
            println!("{}", format!("Saved {}", path.display()).green());
        }
        DashboardCommand::Logout => {
            dashboard.logout();
            println!("{}", "Logged out".green());
            return Ok(Flow::Exit);
        }
        DashboardCommand::Help => print_help(),
        DashboardCommand::Exit => return Ok(Flow::Exit),
        DashboardCommand::None => {}
    }
    Ok(Flow::Continue)
}

fn show_submit_outcome(dashboard: &Dashboard, outcome: SubmitOutcome) {
    match outcome {
        SubmitOutcome::Uploaded(descriptor) => {
            println!(
                "{}",
                format!("Upload successful: dataset {}", descriptor.id).green()
            );
            show_registry(dashboard);
        }
        SubmitOutcome::Skipped if dashboard.upload().is_busy() => {
            println!("{}", "An upload is already in progress".yellow());
        }
        SubmitOutcome::Skipped => {
            println!("{}", "No file chosen; use `upload <file>` first".yellow());
        }
    }
}

fn show_registry(dashboard: &Dashboard) {
    let registry = dashboard.registry();
    render::print_datasets(registry.datasets(), registry.selected());
}

fn show_stats(dashboard: &Dashboard) {
    let analytics = dashboard.analytics();
    match analytics.state() {
        AnalyticsState::Ready { dataset_id, stats } => render::print_stats(*dataset_id, stats),
        AnalyticsState::Empty { dataset_id, error } => println!(
            "{}",
            format!("No statistics for dataset {}: {}", dataset_id, error).yellow()
        ),
        AnalyticsState::Loading { dataset_id } => {
            println!("Loading statistics for dataset {}...", dataset_id)
        }
        AnalyticsState::Idle => println!("{}", "No dataset selected".yellow()),
    }
}

/// Print the events worth telling the user about; log the rest.
fn announce_events(events: &mut broadcast::Receiver<DashboardEvent>) {
    loop {
        match events.try_recv() {
            Ok(DashboardEvent::SessionEnded {
                reason: LogoutReason::Unauthorized,
            }) => {
                println!(
                    "{}",
                    "The server rejected your credentials; you have been logged out.".red()
                );
            }
            Ok(DashboardEvent::UploadReset) => println!("{}", "Upload control reset".dimmed()),
            Ok(DashboardEvent::ReloadFailed { error }) => {
                println!("{}", format!("Could not refresh datasets: {}", error).yellow())
            }
            Ok(event) => tracing::debug!("Dashboard event: {:?}", event),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::debug!("Skipped {} dashboard events", skipped)
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
}

fn print_welcome_banner(config: &Config) {
    println!("\n{}", "Equipviz dashboard".bold());
    println!("Backend: {}", config.api.base_url.cyan());
    println!("Type 'help' for commands, 'quit' to leave.\n");
}
