//! Command-line interface definition for Equipviz
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the session, dataset management and the
//! interactive dashboard.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Equipviz - chemical equipment dataset client
///
/// Upload equipment CSV files, inspect server-computed statistics and
/// download PDF reports.
#[derive(Parser, Debug, Clone)]
#[command(name = "equipviz")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the backend API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Equipviz
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Store a credential for the backend
    Login {
        /// Account name
        #[arg(short, long)]
        username: String,

        /// Account password
        #[arg(short, long, env = "EQUIPVIZ_PASSWORD", hide_env_values = true)]
        password: String,

        /// Check the credential against the backend right away
        #[arg(long)]
        verify: bool,
    },

    /// Forget the stored credential
    Logout,

    /// Show whether a session is stored
    Status,

    /// List the most recent datasets
    Datasets {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Upload an equipment CSV file
    Upload {
        /// CSV file to upload
        file: PathBuf,
    },

    /// Show statistics for a dataset
    Stats {
        /// Dataset id (defaults to the most recent dataset)
        #[arg(short, long)]
        dataset: Option<i64>,

        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Download the PDF report for a dataset
    Report {
        /// Dataset id (defaults to the most recent dataset)
        #[arg(short, long)]
        dataset: Option<i64>,

        /// Directory to save the report into
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start the interactive dashboard
    Dashboard,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            api_url: None,
            command: Commands::Status,
        }
    }
}
