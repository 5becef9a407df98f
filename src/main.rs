//! Equipviz - chemical equipment dataset client
//!
#![doc = "Equipviz - chemical equipment dataset client"]
#![doc = "Main entry point for the equipviz command-line client."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use equipviz::cli::{Cli, Commands};
use equipviz::commands;
use equipviz::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Login {
            username,
            password,
            verify,
        } => {
            tracing::info!("Logging in as {}", username);
            commands::auth::login(&config, &username, &password, verify).await?;
            Ok(())
        }
        Commands::Logout => {
            commands::auth::logout(&config)?;
            Ok(())
        }
        Commands::Status => {
            commands::auth::status(&config)?;
            Ok(())
        }
        Commands::Datasets { json } => {
            commands::datasets::list(&config, json).await?;
            Ok(())
        }
        Commands::Upload { file } => {
            tracing::info!("Uploading {}", file.display());
            commands::datasets::upload(&config, &file).await?;
            Ok(())
        }
        Commands::Stats { dataset, json } => {
            if let Some(id) = dataset {
                tracing::debug!("Using dataset override: {}", id);
            }
            commands::datasets::stats(&config, dataset, json).await?;
            Ok(())
        }
        Commands::Report { dataset, output } => {
            commands::datasets::report(&config, dataset, output).await?;
            Ok(())
        }
        Commands::Dashboard => {
            tracing::info!("Starting interactive dashboard");
            commands::dashboard::run_dashboard(config).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so table and JSON output on stdout stays clean.
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "equipviz=debug"
    } else {
        "equipviz=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
