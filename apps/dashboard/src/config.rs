use std::{fs, path::Path, sync::Arc, time::Duration};

use anyhow::{bail, Context};
use client_core::{CredentialVerifier, MissingCredentialVerifier, StaticCredentialVerifier};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_SERVER_URL: &str = "https://task-backend-5.onrender.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub api_key: Option<String>,
    pub operator_username: Option<String>,
    pub operator_password: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            api_key: None,
            operator_username: None,
            operator_password: None,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    api_key: Option<String>,
    operator_username: Option<String>,
    operator_password: Option<String>,
    request_timeout_secs: Option<u64>,
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn has_operator_account(&self) -> bool {
        self.operator_username.is_some() && self.operator_password.is_some()
    }

    pub fn credential_verifier(&self) -> Arc<dyn CredentialVerifier> {
        match (&self.operator_username, &self.operator_password) {
            (Some(username), Some(password)) => Arc::new(StaticCredentialVerifier::new(
                username.clone(),
                password.clone(),
            )),
            _ => Arc::new(MissingCredentialVerifier),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = Url::parse(&self.server_url)
            .with_context(|| format!("invalid server url '{}'", self.server_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("server url must use http or https, got '{}'", url.scheme());
        }
        if self.request_timeout_secs == 0 {
            bail!("request timeout must be at least one second");
        }
        Ok(())
    }

    fn apply_file(&mut self, file: FileSettings) {
        if let Some(v) = file.server_url {
            self.server_url = v;
        }
        if let Some(v) = file.api_key {
            self.api_key = Some(v);
        }
        if let Some(v) = file.operator_username {
            self.operator_username = Some(v);
        }
        if let Some(v) = file.operator_password {
            self.operator_password = Some(v);
        }
        if let Some(v) = file.request_timeout_secs {
            self.request_timeout_secs = v;
        }
    }

    /// Each setting is read from `DASHBOARD_<NAME>` and then `APP__<NAME>`; the
    /// latter wins when both are set.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |name: &str| {
            lookup(&format!("APP__{name}")).or_else(|| lookup(&format!("DASHBOARD_{name}")))
        };

        if let Some(v) = read("SERVER_URL") {
            self.server_url = v;
        }
        if let Some(v) = read("API_KEY") {
            self.api_key = Some(v);
        }
        if let Some(v) = read("OPERATOR_USERNAME") {
            self.operator_username = Some(v);
        }
        if let Some(v) = read("OPERATOR_PASSWORD") {
            self.operator_password = Some(v);
        }
        if let Some(v) = read("REQUEST_TIMEOUT_SECS") {
            match v.parse::<u64>() {
                Ok(parsed) => self.request_timeout_secs = parsed,
                Err(_) => tracing::warn!(value = %v, "ignoring non-numeric request timeout"),
            }
        }
    }
}

/// Defaults, then `path` if it exists, then the environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    load_settings_with(path, |name| std::env::var(name).ok())
}

fn load_settings_with(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        let file: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
        settings.apply_file(file);
    }

    settings.apply_env(lookup);
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
