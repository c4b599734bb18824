use super::*;

use std::{
    collections::HashMap,
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

use client_core::Credentials;

fn temp_settings_file(contents: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("chore_dashboard_config_test_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("dashboard.toml");
    fs::write(&path, contents).expect("write settings");
    path
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn missing_file_yields_defaults() {
    let settings = load_settings_with(Path::new("/nonexistent/dashboard.toml"), no_env)
        .expect("defaults");
    assert_eq!(settings, Settings::default());
    assert!(!settings.has_operator_account());
}

#[test]
fn file_values_override_defaults() {
    let path = temp_settings_file(
        r#"
server_url = "http://localhost:5000"
operator_username = "operator"
operator_password = "s3cret"
request_timeout_secs = 5
"#,
    );

    let settings = load_settings_with(&path, no_env).expect("settings");
    assert_eq!(settings.server_url, "http://localhost:5000");
    assert_eq!(settings.request_timeout(), Duration::from_secs(5));
    assert!(settings.has_operator_account());
    assert!(settings
        .credential_verifier()
        .verify(&Credentials::new("operator", "s3cret")));

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn environment_overrides_file_and_app_prefix_wins() {
    let path = temp_settings_file("server_url = \"http://from-file:1\"\napi_key = \"file-key\"\n");
    let vars: HashMap<&str, &str> = HashMap::from([
        ("DASHBOARD_SERVER_URL", "http://from-env:2"),
        ("APP__SERVER_URL", "http://from-app-env:3"),
        ("DASHBOARD_API_KEY", "env-key"),
        ("DASHBOARD_REQUEST_TIMEOUT_SECS", "soon"),
    ]);

    let settings =
        load_settings_with(&path, |name| vars.get(name).map(|v| v.to_string())).expect("settings");
    assert_eq!(settings.server_url, "http://from-app-env:3");
    assert_eq!(settings.api_key.as_deref(), Some("env-key"));
    assert_eq!(settings.request_timeout_secs, 30);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn malformed_file_is_an_error() {
    let path = temp_settings_file("server_url = [");
    let err = load_settings_with(&path, no_env).expect_err("must fail");
    assert!(err.to_string().contains("failed to parse settings file"));

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn unknown_keys_are_rejected() {
    let path = temp_settings_file("bind_addr = \"0.0.0.0:1\"\n");
    assert!(load_settings_with(&path, no_env).is_err());

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn validate_rejects_bad_urls_and_zero_timeout() {
    let mut settings = Settings::default();
    assert!(settings.validate().is_ok());

    settings.server_url = "ftp://example.test".into();
    assert!(settings.validate().is_err());

    settings.server_url = "not a url".into();
    assert!(settings.validate().is_err());

    settings = Settings {
        request_timeout_secs: 0,
        ..Settings::default()
    };
    assert!(settings.validate().is_err());
}

#[test]
fn missing_password_means_nobody_can_log_in() {
    let settings = Settings {
        operator_username: Some("operator".into()),
        ..Settings::default()
    };
    assert!(!settings.has_operator_account());
    assert!(!settings
        .credential_verifier()
        .verify(&Credentials::new("operator", "")));
}
