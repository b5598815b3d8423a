use super::*;
use std::{collections::HashMap, fs};

fn environment(vars: &[(&str, &str)]) -> config::Environment {
    let source: HashMap<String, String> = vars
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    config::Environment::with_prefix(ENV_PREFIX).source(Some(source))
}

#[test]
fn defaults_apply_without_file_or_env() {
    let settings = load_settings_from(None, environment(&[])).expect("settings");

    assert_eq!(settings.server_url, None);
    assert_eq!(settings.speech, SpeechBackend::Log);
    assert!(!settings.notifications_granted);
    assert_eq!(settings.call_budget_secs, 600);
    assert!(settings.database_url.starts_with("sqlite://"));
    assert!(settings.database_url.ends_with("companion.db"));
}

#[test]
fn file_overrides_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("companion.toml");
    fs::write(
        &path,
        "server_url = \"http://127.0.0.1:8443\"\nspeech = \"espeak\"\ncall_budget_secs = 120\n",
    )
    .expect("write");

    let settings = load_settings_from(Some(&path), environment(&[])).expect("settings");

    assert_eq!(settings.server_url.as_deref(), Some("http://127.0.0.1:8443"));
    assert_eq!(settings.speech, SpeechBackend::Espeak);
    assert_eq!(settings.call_budget_secs, 120);
}

#[test]
fn environment_overrides_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("companion.toml");
    fs::write(&path, "call_budget_secs = 120\n").expect("write");

    let settings = load_settings_from(
        Some(&path),
        environment(&[
            ("COMPANION__CALL_BUDGET_SECS", "30"),
            ("COMPANION__NOTIFICATIONS_GRANTED", "true"),
            ("COMPANION__DATABASE_URL", "sqlite::memory:"),
        ]),
    )
    .expect("settings");

    assert_eq!(settings.call_budget_secs, 30);
    assert!(settings.notifications_granted);
    assert_eq!(settings.database_url, "sqlite::memory:");
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("absent.toml");

    assert!(load_settings_from(Some(&path), environment(&[])).is_err());
}
