//! Configuration management for Equipviz
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{EquipvizError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for Equipviz
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Session persistence settings
    #[serde(default)]
    pub session: SessionConfig,
    /// Upload control settings
    #[serde(default)]
    pub upload: UploadConfig,
    /// Report download settings
    #[serde(default)]
    pub report: ReportConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL all API paths are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Where the session credential is persisted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CredentialBackend {
    /// A file in the user data directory (or `credential_path`)
    #[default]
    File,
    /// The OS keyring
    Keyring,
    /// Process memory only
    Memory,
}

impl CredentialBackend {
    /// Parse a backend name (case-insensitive)
    pub fn parse_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "keyring" => Ok(Self::Keyring),
            "memory" => Ok(Self::Memory),
            other => Err(EquipvizError::Config(format!(
                "Invalid session backend: {}. Must be one of: file, keyring, memory",
                other
            ))
            .into()),
        }
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Credential store backend
    #[serde(default)]
    pub backend: CredentialBackend,

    /// Well-known key the credential is stored under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Explicit credential file path for the file backend
    #[serde(default)]
    pub credential_path: Option<String>,
}

fn default_storage_key() -> String {
    "authToken".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: CredentialBackend::default(),
            storage_key: default_storage_key(),
            credential_path: None,
        }
    }
}

/// Upload control configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// How long a successful upload stays displayed before the control
    /// resets (milliseconds)
    #[serde(default = "default_success_display_ms")]
    pub success_display_ms: u64,
}

fn default_success_display_ms() -> u64 {
    3000
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            success_display_ms: default_success_display_ms(),
        }
    }
}

impl UploadConfig {
    /// Success display delay as a [`Duration`]
    pub fn success_display(&self) -> Duration {
        Duration::from_millis(self.success_display_ms)
    }
}

/// Report download configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory reports are saved into
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_output_dir() -> String {
    ".".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

impl ReportConfig {
    /// Output directory as a path
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    /// Parse a YAML configuration file
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            EquipvizError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("EQUIPVIZ_API_URL") {
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("EQUIPVIZ_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid EQUIPVIZ_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(backend) = std::env::var("EQUIPVIZ_SESSION_BACKEND") {
            match CredentialBackend::parse_str(&backend) {
                Ok(value) => self.session.backend = value,
                Err(_) => tracing::warn!(
                    "Invalid session backend: {}, keeping {:?}",
                    backend,
                    self.session.backend
                ),
            }
        }

        if let Ok(path) = std::env::var("EQUIPVIZ_CREDENTIAL_PATH") {
            self.session.credential_path = Some(path);
        }

        if let Ok(dir) = std::env::var("EQUIPVIZ_REPORT_DIR") {
            self.report.output_dir = dir;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(url) = &cli.api_url {
            tracing::debug!("Using API URL override: {}", url);
            self.api.base_url = url.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        crate::api::client::normalize_base_url(&self.api.base_url)?;

        if self.api.timeout_seconds == 0 {
            return Err(EquipvizError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.session.storage_key.trim().is_empty() {
            return Err(EquipvizError::Config(
                "session.storage_key cannot be empty".to_string(),
            )
            .into());
        }

        if self.report.output_dir.trim().is_empty() {
            return Err(EquipvizError::Config(
                "report.output_dir cannot be empty".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_file, temp_dir};
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000/api/");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.session.backend, CredentialBackend::File);
        assert_eq!(config.session.storage_key, "authToken");
        assert_eq!(config.upload.success_display(), Duration::from_secs(3));
        assert_eq!(config.report.output_path(), PathBuf::from("."));
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_url() {
        let mut config = Config::default();
        config.api.base_url = "localhost".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.api.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_storage_key() {
        let mut config = Config::default();
        config.session.storage_key = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
api:
  base_url: "https://plant.example.com/api/"
  timeout_seconds: 5
session:
  backend: keyring
upload:
  success_display_ms: 1500
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api.base_url, "https://plant.example.com/api/");
        assert_eq!(config.api.timeout_seconds, 5);
        assert_eq!(config.session.backend, CredentialBackend::Keyring);
        assert_eq!(config.session.storage_key, "authToken");
        assert_eq!(config.upload.success_display_ms, 1500);
        assert_eq!(config.report.output_dir, ".");
    }

    #[test]
    fn test_credential_backend_parse() {
        assert_eq!(
            CredentialBackend::parse_str("MEMORY").unwrap(),
            CredentialBackend::Memory
        );
        assert!(CredentialBackend::parse_str("vault").is_err());
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        let cli = crate::cli::Cli::default();
        let config = Config::load("/nonexistent/config.yaml", &cli).unwrap();
        assert_eq!(config.api.timeout_seconds, 30);
    }

    #[test]
    #[serial]
    fn test_load_file_then_env_then_cli() {
        let dir = temp_dir();
        let path = create_test_file(
            &dir,
            "config.yaml",
            "api:\n  base_url: \"http://file.example/api/\"\n  timeout_seconds: 9\n",
        );

        std::env::set_var("EQUIPVIZ_TIMEOUT_SECONDS", "12");
        std::env::set_var("EQUIPVIZ_SESSION_BACKEND", "memory");
        std::env::set_var("EQUIPVIZ_REPORT_DIR", "/tmp/reports");

        let cli = crate::cli::Cli {
            api_url: Some("http://cli.example/api/".to_string()),
            ..Default::default()
        };
        let config = Config::load(path.to_str().unwrap(), &cli).unwrap();

        std::env::remove_var("EQUIPVIZ_TIMEOUT_SECONDS");
        std::env::remove_var("EQUIPVIZ_SESSION_BACKEND");
        std::env::remove_var("EQUIPVIZ_REPORT_DIR");

        assert_eq!(config.api.base_url, "http://cli.example/api/");
        assert_eq!(config.api.timeout_seconds, 12);
        assert_eq!(config.session.backend, CredentialBackend::Memory);
        assert_eq!(config.report.output_dir, "/tmp/reports");
    }

    #[test]
    #[serial]
    fn test_invalid_env_values_are_ignored() {
        std::env::set_var("EQUIPVIZ_TIMEOUT_SECONDS", "soon");
        std::env::set_var("EQUIPVIZ_SESSION_BACKEND", "vault");
        let config = Config::load("/nonexistent/config.yaml", &crate::cli::Cli::default()).unwrap();
        std::env::remove_var("EQUIPVIZ_TIMEOUT_SECONDS");
        std::env::remove_var("EQUIPVIZ_SESSION_BACKEND");

        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.session.backend, CredentialBackend::File);
    }
}
