//! Equipviz - chemical equipment dataset client library
//!
//! This library provides the client side of the equipment dataset service:
//! an authenticated HTTP client, the dataset registry, upload and analytics
//! view-models, and the coordinator that wires them together.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Credential, session state and credential persistence
//! - `api`: Backend client, wire types and error classification
//! - `registry`: Dataset list and selection
//! - `upload`: CSV upload control
//! - `analytics`: Statistics view, chart series and report download
//! - `dashboard`: Coordinator and shared 401 handling
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface and its handlers
//!
//! # Example
//!
//! ```no_run
//! use equipviz::{commands, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let dashboard = commands::build_dashboard(&config)?;
//!     if dashboard.start().await? {
//!         println!("{} datasets", dashboard.registry().datasets().len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod registry;
pub mod session;
pub mod upload;

// Re-export commonly used types
pub use api::{ApiClient, ApiError, DatasetApi};
pub use config::Config;
pub use dashboard::{Dashboard, DashboardEvent};
pub use error::{EquipvizError, Result};
pub use session::SessionHandle;

#[cfg(test)]
pub mod test_utils;
