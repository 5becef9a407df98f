//! Session store
//!
//! Holds the authentication flag and the Basic credential, persisted through a
//! [`CredentialStore`]. The credential is never verified here: validity is
//! only discovered when the backend answers the next request, and a 401 from
//! any endpoint tears the session down through the dashboard coordinator.
//!
//! [`SessionHandle`] is the explicit context object shared by the API client
//! (which reads the credential on every request) and the coordinator (which
//! logs in and out).

pub mod store;

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use base64::Engine as _;

use crate::error::{EquipvizError, Result};

pub use store::{
    credential_store_from_config, CredentialStore, FileCredentialStore, KeyringCredentialStore,
    MemoryCredentialStore,
};

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// Base64 encoding of `username:password`, sent as Basic authorization.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Encode a username/password pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use equipviz::session::Credential;
    ///
    /// let credential = Credential::from_parts("admin", "secret");
    /// assert_eq!(credential.as_str(), "YWRtaW46c2VjcmV0");
    /// ```
    pub fn from_parts(username: &str, password: &str) -> Self {
        let raw = format!("{}:{}", username, password);
        Self(base64::engine::general_purpose::STANDARD.encode(raw))
    }

    /// Wrap an already encoded credential, as read back from storage.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// The encoded form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("Basic {}", self.0)
    }

    /// Recover `(username, password)` from the encoded form.
    ///
    /// # Errors
    ///
    /// Returns [`EquipvizError::Validation`] if the stored value is not
    /// base64 of a UTF-8 `user:password` pair.
    pub fn decode(&self) -> Result<(String, String)> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&self.0)
            .map_err(|e| EquipvizError::Validation(format!("Credential is not base64: {}", e)))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| EquipvizError::Validation("Credential is not UTF-8".to_string()))?;
        let (user, pass) = text.split_once(':').ok_or_else(|| {
            EquipvizError::Validation("Credential is missing the ':' separator".to_string())
        })?;
        Ok((user.to_string(), pass.to_string()))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Snapshot of the session state.
///
/// `authenticated` implies `credential.is_some()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Whether the client considers itself logged in
    pub authenticated: bool,
    /// Credential attached to outgoing requests
    pub credential: Option<Credential>,
}

/// Shared, cloneable handle to the session state and its persistence.
#[derive(Clone)]
pub struct SessionHandle {
    state: Arc<RwLock<Session>>,
    store: Arc<dyn CredentialStore>,
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl SessionHandle {
    /// Create a logged-out session backed by `store`.
    ///
    /// Call [`SessionHandle::restore`] to pick up a previously persisted
    /// credential.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            state: Arc::new(RwLock::new(Session::default())),
            store,
        }
    }

    /// Restore a persisted credential, optimistically marking the session
    /// authenticated without contacting the backend.
    ///
    /// # Returns
    ///
    /// `true` if a credential was found.
    pub fn restore(&self) -> Result<bool> {
        match self.store.load()? {
            Some(encoded) => {
                let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
                state.credential = Some(Credential::from_encoded(encoded));
                state.authenticated = true;
                tracing::info!("Restored persisted session");
                Ok(true)
            }
            None => {
                tracing::debug!("No persisted session found");
                Ok(false)
            }
        }
    }

    /// Log in with a username and password.
    ///
    /// Both fields must be non-blank and the username may not contain `:`.
    /// No network call is made; the credential is persisted and the session
    /// becomes authenticated.
    ///
    /// # Errors
    ///
    /// Returns [`EquipvizError::Validation`] (with no storage write) for bad
    /// input, or a storage error if persisting fails, in which case the
    /// session stays logged out.
    pub fn login(&self, username: &str, password: &str) -> Result<()> {
        if username.trim().is_empty() {
            return Err(EquipvizError::Validation("Username is required".to_string()).into());
        }
        if password.trim().is_empty() {
            return Err(EquipvizError::Validation("Password is required".to_string()).into());
        }
        if username.contains(':') {
            return Err(
                EquipvizError::Validation("Username may not contain ':'".to_string()).into(),
            );
        }

        let credential = Credential::from_parts(username, password);
        self.store.save(credential.as_str())?;

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.credential = Some(credential);
        state.authenticated = true;
        tracing::info!("Logged in as {}", username);
        Ok(())
    }

    /// Log out: forget the credential in memory and in storage.
    ///
    /// The in-memory session is always cleared; a failure to clear storage is
    /// still returned to the caller.
    pub fn logout(&self) -> Result<()> {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            *state = Session::default();
        }
        tracing::info!("Session ended");
        self.store.clear()
    }

    /// Whether the session is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .authenticated
    }

    /// The credential to attach to outgoing requests, if any.
    pub fn credential(&self) -> Option<Credential> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .credential
            .clone()
    }

    /// Copy of the current session state.
    pub fn snapshot(&self) -> Session {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
