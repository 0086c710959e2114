//! Error types surfaced by the directory client.

use std::{fmt, path::PathBuf};

use thiserror::Error;

/// The remote operation an error or notice refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectoryAction {
    LoadUsers,
    UpdateUser,
    DeleteUser,
}

impl DirectoryAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LoadUsers => "load_users",
            Self::UpdateUser => "update_user",
            Self::DeleteUser => "delete_user",
        }
    }

    /// User-facing text shown when the action fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::LoadUsers => "Failed to load users",
            Self::UpdateUser => "Failed to update user",
            Self::DeleteUser => "Failed to delete user",
        }
    }

    /// User-facing text shown when the action succeeds. Page loads are silent.
    pub fn success_message(self) -> Option<&'static str> {
        match self {
            Self::LoadUsers => None,
            Self::UpdateUser => Some("User updated successfully"),
            Self::DeleteUser => Some("User deleted successfully"),
        }
    }
}

impl fmt::Display for DirectoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote request failed.
///
/// Transport errors, non-success statuses, timeouts and undecodable bodies
/// are not distinguished; `detail` only feeds diagnostics.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{action} request failed: {detail}")]
pub struct DirectoryError {
    pub action: DirectoryAction,
    pub detail: String,
}

impl DirectoryError {
    pub fn new(action: DirectoryAction, detail: impl Into<String>) -> Self {
        Self {
            action,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to access session file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("session file '{path}' is not valid JSON: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("session store is poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum ClientSetupError {
    #[error("invalid directory base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("api key is not a valid header value: {0}")]
    InvalidApiKey(String),
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
