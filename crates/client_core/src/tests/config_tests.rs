use std::collections::HashMap;

use super::*;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| vars.get(name).cloned()
}

#[test]
fn defaults_point_at_public_directory_without_timeout() {
    let settings = DirectorySettings::default();
    assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    assert_eq!(settings.api_key, None);
    assert_eq!(settings.request_timeout, None);
    assert!(settings.session_file.ends_with("userdesk/session.json"));
}

#[test]
fn file_settings_overlay_defaults() {
    let mut settings = DirectorySettings::default();
    apply_file_settings(
        &mut settings,
        r#"
        base_url = "http://127.0.0.1:9000/api"
        timeout_secs = 5
        session_file = "/tmp/userdesk-test/session.json"
        "#,
    );

    assert_eq!(settings.base_url, "http://127.0.0.1:9000/api");
    assert_eq!(settings.request_timeout, Some(Duration::from_secs(5)));
    assert_eq!(
        settings.session_file,
        PathBuf::from("/tmp/userdesk-test/session.json")
    );
    assert_eq!(settings.api_key, None);
}

#[test]
fn malformed_file_settings_are_ignored() {
    let mut settings = DirectorySettings::default();
    apply_file_settings(&mut settings, "base_url = [not toml");
    assert_eq!(settings, DirectorySettings::default());
}

#[test]
fn app_alias_wins_over_plain_env_var() {
    let mut settings = DirectorySettings::default();
    apply_env_overrides(
        &mut settings,
        env(&[
            ("USERDESK_BASE_URL", "http://plain"),
            ("APP__BASE_URL", "http://alias"),
            ("USERDESK_API_KEY", "secret"),
        ]),
    );
    assert_eq!(settings.base_url, "http://alias");
    assert_eq!(settings.api_key.as_deref(), Some("secret"));
}

#[test]
fn zero_or_invalid_timeout_keeps_requests_unbounded() {
    let mut settings = DirectorySettings::default();
    apply_env_overrides(&mut settings, env(&[("USERDESK_TIMEOUT_SECS", "0")]));
    assert_eq!(settings.request_timeout, None);

    apply_env_overrides(&mut settings, env(&[("USERDESK_TIMEOUT_SECS", "soon")]));
    assert_eq!(settings.request_timeout, None);

    apply_env_overrides(&mut settings, env(&[("USERDESK_TIMEOUT_SECS", "12")]));
    assert_eq!(settings.request_timeout, Some(Duration::from_secs(12)));
}

#[test]
fn blank_env_values_do_not_override() {
    let mut settings = DirectorySettings::default();
    apply_env_overrides(&mut settings, env(&[("USERDESK_BASE_URL", "  ")]));
    assert_eq!(settings.base_url, DEFAULT_BASE_URL);
}
