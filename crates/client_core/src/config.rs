use std::{fs, path::PathBuf, time::Duration};

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://reqres.in/api";
pub const SETTINGS_FILE: &str = "userdesk.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySettings {
    pub base_url: String,
    /// Sent as `x-api-key` when present.
    pub api_key: Option<String>,
    /// `None` means requests may stay outstanding indefinitely.
    pub request_timeout: Option<Duration>,
    pub session_file: PathBuf,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: None,
            request_timeout: None,
            session_file: default_session_file(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
    session_file: Option<PathBuf>,
}

pub fn default_session_file() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("userdesk")
        .join("session.json")
}

/// Defaults, then `userdesk.toml` in the working directory, then environment.
pub fn load_settings() -> DirectorySettings {
    let mut settings = DirectorySettings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file_settings(&mut settings, &raw);
    }

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    settings
}

/// Overlays values from a TOML document. Malformed documents are ignored.
pub fn apply_file_settings(settings: &mut DirectorySettings, raw: &str) {
    let file_cfg = match toml::from_str::<FileSettings>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            tracing::warn!("ignoring malformed {SETTINGS_FILE}: {err}");
            return;
        }
    };

    if let Some(v) = file_cfg.base_url {
        settings.base_url = v;
    }
    if let Some(v) = file_cfg.api_key {
        settings.api_key = Some(v);
    }
    if let Some(v) = file_cfg.timeout_secs {
        settings.request_timeout = timeout_from_secs(v);
    }
    if let Some(v) = file_cfg.session_file {
        settings.session_file = v;
    }
}

pub fn apply_env_overrides(
    settings: &mut DirectorySettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let read = |primary: &str, alias: &str| {
        lookup(alias)
            .or_else(|| lookup(primary))
            .filter(|v| !v.trim().is_empty())
    };

    if let Some(v) = read("USERDESK_BASE_URL", "APP__BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = read("USERDESK_API_KEY", "APP__API_KEY") {
        settings.api_key = Some(v);
    }
    if let Some(v) = read("USERDESK_TIMEOUT_SECS", "APP__TIMEOUT_SECS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) => settings.request_timeout = timeout_from_secs(parsed),
            Err(err) => tracing::warn!("ignoring invalid timeout '{v}': {err}"),
        }
    }
    if let Some(v) = read("USERDESK_SESSION_FILE", "APP__SESSION_FILE") {
        settings.session_file = PathBuf::from(v);
    }
}

/// Zero disables the timeout.
fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
