//! Bearer credential persistence and the session guard
//!
//! The credential is an opaque token issued by `POST /token`. It is written
//! on successful login, read by every outbound request, and cleared on
//! logout or when the server rejects it.
//!
//! The session guard fails closed: without a stored token it refuses to
//! produce a [`Session`], and nothing that talks to the API can be built
//! without one.

use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Token store backed by a file in the data folder
///
/// Reads are served from memory; writes go to disk first so a crash never
/// leaves the cache ahead of the file.
#[derive(Debug)]
pub struct CredentialStore {
    /// None for stores that never touch disk
    path: Option<PathBuf>,
    token: RwLock<Option<String>>,
}

impl CredentialStore {
    /// Open the store at `path`, loading any token persisted there
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let token = match fs::read_to_string(&path) {
            Ok(content) => {
                let trimmed = content.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(Error::Credential(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        debug!(
            "Credential store at {} (token present: {})",
            path.display(),
            token.is_some()
        );

        Ok(Self {
            path: Some(path),
            token: RwLock::new(token),
        })
    }

    /// Store that only lives for the current process
    pub fn in_memory(token: Option<String>) -> Self {
        Self {
            path: None,
            token: RwLock::new(token),
        }
    }

    /// File backing this store, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current bearer token
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Persist a freshly issued token
    pub fn store(&self, token: &str) -> Result<()> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, token).map_err(|e| {
                Error::Credential(format!("failed to write {}: {}", path.display(), e))
            })?;
        }

        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        info!("Credential stored");
        Ok(())
    }

    /// Forget the token (logout or server rejection)
    pub fn clear(&self) -> Result<()> {
        if let Some(path) = &self.path {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(Error::Credential(format!(
                        "failed to remove {}: {}",
                        path.display(),
                        e
                    )))
                }
            }
        }

        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        info!("Credential cleared");
        Ok(())
    }
}

// ========================================
// Session Guard
// ========================================

/// Proof that a credential was present when the guard ran
///
/// Only [`SessionGuard::enforce`] can construct one.
#[derive(Debug, Clone)]
pub struct Session {
    store: Arc<CredentialStore>,
}

impl Session {
    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.store
    }
}

/// Instruction to send the user to the login view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginRedirect;

impl std::fmt::Display for LoginRedirect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Not logged in. Run `gradedesk login` first.")
    }
}

impl std::error::Error for LoginRedirect {}

/// Startup check for a persisted credential
pub struct SessionGuard;

impl SessionGuard {
    /// Produce a session, or a redirect when no token is stored
    ///
    /// No grace period and no background refresh: the check is a single
    /// read of the store.
    pub fn enforce(store: Arc<CredentialStore>) -> std::result::Result<Session, LoginRedirect> {
        if store.has_token() {
            Ok(Session { store })
        } else {
            info!("No credential present, redirecting to login");
            Err(LoginRedirect)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_redirects_without_token() {
        let store = Arc::new(CredentialStore::in_memory(None));
        assert_eq!(SessionGuard::enforce(store).unwrap_err(), LoginRedirect);
    }

    #[test]
    fn test_guard_admits_with_token() {
        let store = Arc::new(CredentialStore::in_memory(Some("abc".to_string())));
        let session = SessionGuard::enforce(store).unwrap();
        assert_eq!(session.credentials().token().as_deref(), Some("abc"));
    }

    #[test]
    fn test_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credential");

        let store = CredentialStore::open(&path).unwrap();
        assert!(!store.has_token());
        store.store("token-123").unwrap();

        let reopened = CredentialStore::open(&path).unwrap();
        assert_eq!(reopened.token().as_deref(), Some("token-123"));
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credential");

        let store = CredentialStore::open(&path).unwrap();
        store.store("t").unwrap();
        store.clear().unwrap();

        assert!(!path.exists());
        assert!(!store.has_token());
        // Clearing twice is harmless
        store.clear().unwrap();
    }

    #[test]
    fn test_blank_file_means_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credential");
        fs::write(&path, "  \n").unwrap();

        let store = CredentialStore::open(&path).unwrap();
        assert!(!store.has_token());
    }
}
