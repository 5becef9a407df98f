//! Credential persistence backends
//!
//! A session survives process restarts by persisting its encoded credential
//! under a well-known storage key. Three backends implement
//! [`CredentialStore`]:
//!
//! - [`FileCredentialStore`] -- a single file in the platform data directory
//!   (or an explicit path).
//! - [`KeyringCredentialStore`] -- the OS native credential store.
//! - [`MemoryCredentialStore`] -- in-process only; nothing survives exit.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use directories::ProjectDirs;

use crate::config::{CredentialBackend, SessionConfig};
use crate::error::{EquipvizError, Result};

/// Keyring service name under which credentials are filed.
const KEYRING_SERVICE: &str = "equipviz";

/// Persistent storage for a single encoded credential string.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialStore: Send + Sync {
    /// Returns the stored credential, or `None` when nothing is stored.
    fn load(&self) -> Result<Option<String>>;

    /// Stores `credential`, replacing any previous value.
    fn save(&self, credential: &str) -> Result<()>;

    /// Removes the stored credential. Clearing an empty store succeeds.
    fn clear(&self) -> Result<()>;
}

/// Builds the credential store selected by the session configuration.
///
/// # Errors
///
/// Returns [`EquipvizError::Storage`] if the platform data directory cannot
/// be determined for the file backend, or a keyring error if the OS store
/// rejects the entry.
pub fn credential_store_from_config(config: &SessionConfig) -> Result<Arc<dyn CredentialStore>> {
    let store: Arc<dyn CredentialStore> = match config.backend {
        CredentialBackend::File => match &config.credential_path {
            Some(path) => Arc::new(FileCredentialStore::new(path)),
            None => Arc::new(FileCredentialStore::in_data_dir(&config.storage_key)?),
        },
        CredentialBackend::Keyring => Arc::new(KeyringCredentialStore::new(&config.storage_key)?),
        CredentialBackend::Memory => Arc::new(MemoryCredentialStore::default()),
    };
    tracing::debug!("Using {:?} credential store", config.backend);
    Ok(store)
}

// ---------------------------------------------------------------------------
// FileCredentialStore
// ---------------------------------------------------------------------------

/// Stores the credential as the sole contents of one file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store backed by the file at `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Create a store that keeps the file named `storage_key` in the user's
    /// application data directory.
    pub fn in_data_dir(storage_key: &str) -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "equipviz", "equipviz")
            .ok_or_else(|| EquipvizError::Storage("Could not determine data directory".into()))?;
        Ok(Self::new(proj_dirs.data_dir().join(storage_key)))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let trimmed = contents.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(trimmed.to_string()))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(EquipvizError::Storage(format!(
                "Failed to read credential file {}: {}",
                self.path.display(),
                e
            ))
            .into()),
        }
    }

    fn save(&self, credential: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EquipvizError::Storage(format!(
                    "Failed to create credential directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let written = options.open(&self.path).and_then(|mut file| {
            // `mode` only applies to new files; tighten an existing one
            // before the credential goes in.
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
            }
            file.write_all(credential.as_bytes())
        });
        written.map_err(|e| {
            EquipvizError::Storage(format!(
                "Failed to write credential file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EquipvizError::Storage(format!(
                "Failed to remove credential file {}: {}",
                self.path.display(),
                e
            ))
            .into()),
        }
    }
}

// ---------------------------------------------------------------------------
// KeyringCredentialStore
// ---------------------------------------------------------------------------

/// Stores the credential in the OS keyring (Keychain, Secret Service,
/// Windows Credential Manager).
pub struct KeyringCredentialStore {
    entry: keyring::Entry,
}

impl KeyringCredentialStore {
    /// Create a store for the keyring account named `storage_key`.
    pub fn new(storage_key: &str) -> Result<Self> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, storage_key)
            .map_err(EquipvizError::Keyring)?;
        Ok(Self { entry })
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn load(&self) -> Result<Option<String>> {
        match self.entry.get_password() {
            Ok(credential) => Ok(Some(credential)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(EquipvizError::Keyring(e).into()),
        }
    }

    fn save(&self, credential: &str) -> Result<()> {
        self.entry
            .set_password(credential)
            .map_err(EquipvizError::Keyring)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match self.entry.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(EquipvizError::Keyring(e).into()),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryCredentialStore
// ---------------------------------------------------------------------------

/// In-process store; contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    value: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    /// Create a store pre-populated with `credential`.
    pub fn with_credential(credential: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(credential.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self
            .value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, credential: &str) -> Result<()> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(credential.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
