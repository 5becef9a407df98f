//! Session commands: login, logout, status

use colored::Colorize;

use crate::api::ApiError;
use crate::commands::build_dashboard;
use crate::config::Config;
use crate::error::{EquipvizError, Result};
use crate::registry::RegistryStatus;

/// Store a credential for `username`.
///
/// Without `verify` no request is made: the backend judges the credential
/// on the next command. With `verify` the dataset list is fetched once and
/// the credential is dropped again if that fails.
///
/// # Errors
///
/// Returns a validation error for blank input, a storage error if the
/// credential cannot be persisted, or the verification failure.
pub async fn login(config: &Config, username: &str, password: &str, verify: bool) -> Result<()> {
    let dashboard = build_dashboard(config)?.without_auto_analytics();

    if !verify {
        dashboard.session().login(username, password)?;
        println!("{}", format!("Logged in as {}", username).green());
        return Ok(());
    }

    dashboard.login(username, password).await?;

    if !dashboard.session().is_authenticated() {
        println!("{}", "Invalid credentials".red());
        return Err(EquipvizError::Api(ApiError::Unauthorized).into());
    }

    let registry = dashboard.registry();
    if let RegistryStatus::Error(message) = registry.status() {
        dashboard.logout();
        println!("{}", "Could not verify credentials".red());
        return Err(EquipvizError::Validation(format!(
            "Could not verify credentials: {}",
            message
        ))
        .into());
    }

    println!(
        "{}",
        format!(
            "Logged in as {} ({} datasets available)",
            username,
            registry.datasets().len()
        )
        .green()
    );
    Ok(())
}

/// Forget the stored credential.
pub fn logout(config: &Config) -> Result<()> {
    let dashboard = build_dashboard(config)?;
    dashboard.session().restore()?;
    dashboard.logout();
    println!("{}", "Logged out".green());
    Ok(())
}

/// Print whether a credential is stored, and for which user. Makes no
/// request.
pub fn status(config: &Config) -> Result<()> {
    let dashboard = build_dashboard(config)?;
    println!("Backend:  {}", config.api.base_url);

    if !dashboard.session().restore()? {
        println!("Session:  {}", "not logged in".yellow());
        return Ok(());
    }

    match dashboard.session().credential().map(|c| c.decode()) {
        Some(Ok((username, _))) => println!("Session:  logged in as {}", username.cyan()),
        Some(Err(e)) => {
            tracing::warn!("Stored credential is unreadable: {}", e);
            println!("Session:  {}", "stored credential is unreadable".yellow());
        }
        None => println!("Session:  {}", "not logged in".yellow()),
    }
    Ok(())
}
