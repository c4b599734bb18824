//! Credential gate in front of every protected action.

use std::{fmt, sync::Arc};

use shared::error::{DashboardError, DashboardResult};
use subtle::ConstantTimeEq;
use tracing::{info, warn};
use zeroize::Zeroize;

use crate::dispatcher::ProtectedAction;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn clear(&mut self) {
        self.username.zeroize();
        self.password.zeroize();
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Drop for Credentials {
    fn drop(&mut self) {
        self.clear();
    }
}

pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, credentials: &Credentials) -> bool;
}

/// Accepts exactly one operator account, supplied at startup.
pub struct StaticCredentialVerifier {
    expected: Credentials,
}

impl StaticCredentialVerifier {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            expected: Credentials::new(username, password),
        }
    }
}

impl CredentialVerifier for StaticCredentialVerifier {
    fn verify(&self, credentials: &Credentials) -> bool {
        let username = credentials
            .username
            .as_bytes()
            .ct_eq(self.expected.username.as_bytes());
        let password = credentials
            .password
            .as_bytes()
            .ct_eq(self.expected.password.as_bytes());
        bool::from(username & password)
    }
}

/// Used when no operator account is configured: nobody gets through.
pub struct MissingCredentialVerifier;

impl CredentialVerifier for MissingCredentialVerifier {
    fn verify(&self, _credentials: &Credentials) -> bool {
        false
    }
}

pub struct AuthGate {
    verifier: Arc<dyn CredentialVerifier>,
    authenticated: bool,
    pending: Option<ProtectedAction>,
    prompt: Option<Credentials>,
}

impl AuthGate {
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            verifier,
            authenticated: false,
            pending: None,
            prompt: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn pending(&self) -> Option<ProtectedAction> {
        self.pending
    }

    pub fn is_prompt_open(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.prompt.as_ref()
    }

    /// Parks `action` until authentication succeeds and opens the prompt.
    ///
    /// Only the latest request is remembered; the action it displaced is returned.
    pub fn defer(&mut self, action: ProtectedAction) -> Option<ProtectedAction> {
        self.prompt.get_or_insert_with(Credentials::default);
        self.pending.replace(action)
    }

    pub fn set_username(&mut self, username: impl Into<String>) -> DashboardResult<()> {
        let prompt = self.prompt_mut()?;
        prompt.username.zeroize();
        prompt.username = username.into();
        Ok(())
    }

    pub fn set_password(&mut self, password: impl Into<String>) -> DashboardResult<()> {
        let prompt = self.prompt_mut()?;
        prompt.password.zeroize();
        prompt.password = password.into();
        Ok(())
    }

    /// Verifies whatever was typed into the open prompt.
    pub fn submit(&mut self) -> DashboardResult<Option<ProtectedAction>> {
        let credentials = self.prompt_mut()?.clone();
        self.authenticate(&credentials)
    }

    /// On success the session becomes authenticated for good, the prompt closes and
    /// the parked action (if any) is handed back once for replay.
    pub fn authenticate(
        &mut self,
        credentials: &Credentials,
    ) -> DashboardResult<Option<ProtectedAction>> {
        if !self.verifier.verify(credentials) {
            warn!(pending = ?self.pending, "auth: credentials rejected");
            return Err(DashboardError::auth("invalid credentials"));
        }

        self.authenticated = true;
        self.prompt = None;
        let replay = self.pending.take();
        info!(replay = ?replay, "auth: session authenticated");
        Ok(replay)
    }

    /// Closes the prompt and forgets the parked action without running it.
    pub fn cancel(&mut self) -> Option<ProtectedAction> {
        self.prompt = None;
        self.pending.take()
    }

    fn prompt_mut(&mut self) -> DashboardResult<&mut Credentials> {
        self.prompt
            .as_mut()
            .ok_or_else(|| DashboardError::validation("no authentication prompt is open"))
    }
}

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod tests;
