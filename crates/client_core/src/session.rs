//! Persisted session token and the gate that checks it on mount.

use std::{
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use crate::error::SessionError;

/// Key the token is persisted under.
pub const TOKEN_KEY: &str = "token";

/// Screens a navigation can land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Sign-in screen.
    Entry,
    Users,
}

pub trait SessionStore: Send + Sync {
    fn token(&self) -> Result<Option<String>, SessionError>;
    fn store_token(&self, token: &str) -> Result<(), SessionError>;
    fn clear_token(&self) -> Result<(), SessionError>;
}

/// Keeps the token in a small JSON object on disk, next to any other keys
/// already present in the file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(source) => {
                return Err(SessionError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| SessionError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        let io_err = |source| SessionError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let serialized = serde_json::to_string_pretty(entries).map_err(|source| {
            SessionError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, serialized).map_err(io_err)
    }
}

impl SessionStore for FileSessionStore {
    fn token(&self) -> Result<Option<String>, SessionError> {
        Ok(self
            .read_entries()?
            .remove(TOKEN_KEY)
            .filter(|token| !token.is_empty()))
    }

    fn store_token(&self, token: &str) -> Result<(), SessionError> {
        let mut entries = self.read_entries()?;
        entries.insert(TOKEN_KEY.to_string(), token.to_string());
        self.write_entries(&entries)
    }

    fn clear_token(&self) -> Result<(), SessionError> {
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            // Unreadable contents cannot authenticate anyone; replace them.
            Err(SessionError::Malformed { .. }) => BTreeMap::new(),
            Err(err) => return Err(err),
        };
        entries.remove(TOKEN_KEY);
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(source) => Err(SessionError::Io {
                    path: self.path.clone(),
                    source,
                }),
            };
        }
        self.write_entries(&entries)
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Result<Option<String>, SessionError> {
        let guard = self.token.lock().map_err(|_| SessionError::Poisoned)?;
        Ok(guard.clone())
    }

    fn store_token(&self, token: &str) -> Result<(), SessionError> {
        let mut guard = self.token.lock().map_err(|_| SessionError::Poisoned)?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear_token(&self) -> Result<(), SessionError> {
        let mut guard = self.token.lock().map_err(|_| SessionError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}

/// Narrow handle to the persisted session handed to the controller.
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn token(&self) -> Result<Option<String>, SessionError> {
        self.store.token()
    }

    pub fn sign_in(&self, token: &str) -> Result<(), SessionError> {
        self.store.store_token(token)
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        self.store.clear_token()
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    Redirect(Route),
}

/// Presence of a token is the only check; it is never validated.
pub struct SessionGate;

impl SessionGate {
    pub fn check(session: &SessionContext) -> GateDecision {
        match session.token() {
            Ok(Some(_)) => GateDecision::Proceed,
            Ok(None) => GateDecision::Redirect(Route::Entry),
            Err(err) => {
                tracing::warn!("treating unreadable session as signed out: {err}");
                GateDecision::Redirect(Route::Entry)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
