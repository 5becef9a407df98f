//! Error types for Equipviz
//!
//! This module defines the crate-level error type, using `thiserror` for
//! ergonomic error handling. Backend failures are classified separately in
//! [`crate::api::ApiError`] and wrapped here when they leave the API layer.

use thiserror::Error;

use crate::api::ApiError;

/// Main error type for Equipviz operations
///
/// Encompasses configuration problems, local input validation, credential
/// storage failures, and classified backend failures.
#[derive(Error, Debug)]
pub enum EquipvizError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bad or missing user input, rejected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Credential storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Command requires an authenticated session
    #[error("Not logged in: run `equipviz login` first")]
    NotAuthenticated,

    /// Classified backend failure
    #[error(transparent)]
    Api(#[from] ApiError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl EquipvizError {
    /// Returns `true` when the error is a backend 401
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, EquipvizError::Api(ApiError::Unauthorized))
    }
}

/// Returns `true` if an `anyhow` error chain carries a backend 401.
///
/// Looks through both a bare [`ApiError`] and one wrapped in
/// [`EquipvizError::Api`].
pub fn is_unauthorized(err: &anyhow::Error) -> bool {
    if let Some(api) = err.downcast_ref::<ApiError>() {
        return api.is_unauthorized();
    }
    err.downcast_ref::<EquipvizError>()
        .map(EquipvizError::is_unauthorized)
        .unwrap_or(false)
}

/// Result type alias for Equipviz operations
///
/// Uses `anyhow::Error` so callers can attach context while typed errors
/// remain recoverable through `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;
