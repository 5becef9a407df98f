/*!
Command handlers for the CLI

This module provides the handlers invoked by the CLI entrypoint:

- `auth`: login, logout and session status
- `datasets`: one-shot list, upload, statistics and report commands
- `dashboard`: the interactive dashboard loop
- `render`: tables and JSON output shared by the handlers

Handlers build a [`Dashboard`] from the configuration and drive it; they do
not talk to the backend directly.
*/

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::error::{EquipvizError, Result};
use crate::session::{credential_store_from_config, SessionHandle};

pub mod auth;
pub mod dashboard;
pub mod dashboard_commands;
pub mod datasets;
pub mod render;

/// Wire a dashboard from configuration: credential store, session, HTTP
/// client.
///
/// # Errors
///
/// Returns an error if the credential store cannot be opened or the base URL
/// is invalid.
pub fn build_dashboard(config: &Config) -> Result<Dashboard> {
    let store = credential_store_from_config(&config.session)?;
    let session = SessionHandle::new(store);
    let client = ApiClient::new(&config.api, session.clone())?;
    tracing::debug!("Using backend at {}", client.base_url());
    Ok(Dashboard::new(
        session,
        Arc::new(client),
        config.upload.success_display(),
    ))
}

/// Restore the stored session and load the dataset list, for one-shot
/// commands. Statistics are not fetched.
///
/// # Errors
///
/// Returns [`EquipvizError::NotAuthenticated`] when no credential is stored,
/// or the list error (a 401 also clears the stored credential).
pub async fn connect(config: &Config) -> Result<Dashboard> {
    let dashboard = build_dashboard(config)?.without_auto_analytics();
    resume(&dashboard).await?;
    Ok(dashboard)
}

/// Restore the stored session of `dashboard` and load the dataset list.
pub async fn resume(dashboard: &Dashboard) -> Result<()> {
    if !dashboard.session().restore()? {
        return Err(EquipvizError::NotAuthenticated.into());
    }
    dashboard.reload().await
}
