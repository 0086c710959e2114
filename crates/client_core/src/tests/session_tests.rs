use std::time::{SystemTime, UNIX_EPOCH};

use super::*;

fn temp_session_path(label: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    std::env::temp_dir()
        .join(format!("userdesk_session_{label}_{suffix}"))
        .join("session.json")
}

fn cleanup(path: &Path) {
    if let Some(parent) = path.parent() {
        let _ = fs::remove_dir_all(parent);
    }
}

#[test]
fn missing_file_means_no_token() {
    let path = temp_session_path("missing");
    let store = FileSessionStore::new(&path);
    assert_eq!(store.token().expect("read"), None);
}

#[test]
fn file_store_round_trips_and_clears_token() {
    let path = temp_session_path("roundtrip");
    let store = FileSessionStore::new(&path);

    store.store_token("QpwL5tke4Pnpja7X4").expect("store");
    assert_eq!(
        store.token().expect("read").as_deref(),
        Some("QpwL5tke4Pnpja7X4")
    );

    store.clear_token().expect("clear");
    assert_eq!(store.token().expect("read"), None);
    assert!(!path.exists());
    cleanup(&path);
}

#[test]
fn clearing_keeps_unrelated_keys() {
    let path = temp_session_path("unrelated");
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(&path, r#"{"theme":"dark","token":"abc"}"#).expect("seed");

    let store = FileSessionStore::new(&path);
    store.clear_token().expect("clear");

    let raw = fs::read_to_string(&path).expect("read back");
    assert!(raw.contains("theme"));
    assert!(!raw.contains("abc"));
    cleanup(&path);
}

#[test]
fn malformed_file_is_an_error_but_clear_recovers() {
    let path = temp_session_path("malformed");
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(&path, "not json").expect("seed");

    let store = FileSessionStore::new(&path);
    assert!(matches!(store.token(), Err(SessionError::Malformed { .. })));

    store.clear_token().expect("clear");
    assert_eq!(store.token().expect("read"), None);
    cleanup(&path);
}

#[test]
fn gate_redirects_without_token_and_proceeds_with_one() {
    let session = SessionContext::new(Arc::new(MemorySessionStore::default()));
    assert_eq!(SessionGate::check(&session), GateDecision::Redirect(Route::Entry));

    session.sign_in("token-1").expect("sign in");
    assert_eq!(SessionGate::check(&session), GateDecision::Proceed);

    session.clear().expect("clear");
    assert_eq!(SessionGate::check(&session), GateDecision::Redirect(Route::Entry));
}

#[test]
fn gate_treats_unreadable_session_as_signed_out() {
    let path = temp_session_path("gate");
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(&path, "{").expect("seed");

    let session = SessionContext::new(Arc::new(FileSessionStore::new(&path)));
    assert_eq!(SessionGate::check(&session), GateDecision::Redirect(Route::Entry));
    cleanup(&path);
}

#[test]
fn empty_token_value_does_not_pass_the_gate() {
    let path = temp_session_path("empty");
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(&path, r#"{"token":""}"#).expect("seed");

    let session = SessionContext::new(Arc::new(FileSessionStore::new(&path)));
    assert_eq!(SessionGate::check(&session), GateDecision::Redirect(Route::Entry));
    cleanup(&path);
}
