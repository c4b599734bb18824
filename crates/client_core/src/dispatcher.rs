//! Routes operator actions through the credential gate and into the service.

use std::sync::Arc;

use shared::error::{DashboardError, DashboardResult, ErrorKind};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    auth::{AuthGate, CredentialVerifier, Credentials},
    creation::{CreationWorkflow, Draft, DraftField, EntityKind, SubmitOutcome},
    service::TaskService,
    sync::{RefreshOutcome, SyncController},
    view::ViewModel,
};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectedAction {
    Reassign,
    OpenCreateParticipantForm,
    OpenCreateTaskForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionEffect {
    Reassign,
    OpenForm(EntityKind),
}

impl ProtectedAction {
    fn effect(self) -> ActionEffect {
        match self {
            Self::Reassign => ActionEffect::Reassign,
            Self::OpenCreateParticipantForm => ActionEffect::OpenForm(EntityKind::Participant),
            Self::OpenCreateTaskForm => ActionEffect::OpenForm(EntityKind::Task),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Reassign => "reassign",
            Self::OpenCreateParticipantForm => "add_student",
            Self::OpenCreateTaskForm => "add_task",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    Synced {
        seq: u64,
        participants: usize,
        reassignment_day: bool,
    },
    AuthPromptOpened {
        pending: ProtectedAction,
    },
    AuthPromptClosed,
    Authenticated,
    FormOpened(EntityKind),
    FormClosed(EntityKind),
    Reassigned,
    EntityCreated(EntityKind),
    Error {
        kind: ErrorKind,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Executed,
    /// Parked behind the credential prompt.
    Deferred,
}

#[derive(Debug)]
pub struct AuthOutcome {
    pub replayed: Option<ProtectedAction>,
    /// Result of running the replayed action; `Ok` when nothing was pending.
    pub replay: DashboardResult<()>,
}

/// The single session context: credential gate, open form and sync handle.
pub struct ActionDispatcher {
    service: Arc<dyn TaskService>,
    sync: Arc<SyncController>,
    gate: AuthGate,
    creation: CreationWorkflow,
    last_error: Option<String>,
    events: broadcast::Sender<DashboardEvent>,
}

impl ActionDispatcher {
    pub fn new(service: Arc<dyn TaskService>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            sync: SyncController::new(Arc::clone(&service)),
            service,
            gate: AuthGate::new(verifier),
            creation: CreationWorkflow::new(),
            last_error: None,
            events,
        }
    }

    pub fn sync(&self) -> &Arc<SyncController> {
        &self.sync
    }

    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    pub fn creation(&self) -> &CreationWorkflow {
        &self.creation
    }

    pub fn is_loading(&self) -> bool {
        self.sync.is_loading()
    }

    /// The message the operator should currently see, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    pub async fn view(&self) -> ViewModel {
        self.sync.view().await
    }

    pub async fn refresh(&mut self) -> DashboardResult<RefreshOutcome> {
        let result = self.sync.refresh().await;
        self.record_refresh(result).await
    }

    /// Runs `action` now if the session is authenticated, otherwise parks it and
    /// opens the credential prompt.
    pub async fn request(&mut self, action: ProtectedAction) -> DashboardResult<RequestOutcome> {
        if !self.gate.is_authenticated() {
            let displaced = self.gate.defer(action);
            debug!(
                action = action.name(),
                displaced = ?displaced.map(ProtectedAction::name),
                "dispatch: deferred until authenticated"
            );
            self.emit(DashboardEvent::AuthPromptOpened { pending: action });
            return Ok(RequestOutcome::Deferred);
        }

        debug!(action = action.name(), "dispatch: executing");
        self.execute(action).await?;
        Ok(RequestOutcome::Executed)
    }

    pub fn set_username(&mut self, username: impl Into<String>) -> DashboardResult<()> {
        let result = self.gate.set_username(username);
        result.map_err(|err| self.surface(err))
    }

    pub fn set_password(&mut self, password: impl Into<String>) -> DashboardResult<()> {
        let result = self.gate.set_password(password);
        result.map_err(|err| self.surface(err))
    }

    /// Submits the credentials typed into the open prompt.
    pub async fn submit_credentials(&mut self) -> DashboardResult<AuthOutcome> {
        let result = self.gate.submit();
        self.finish_authentication(result).await
    }

    pub async fn authenticate(&mut self, credentials: &Credentials) -> DashboardResult<AuthOutcome> {
        let result = self.gate.authenticate(credentials);
        self.finish_authentication(result).await
    }

    /// Closes the prompt. The parked action is dropped, never run.
    pub fn cancel_authentication(&mut self) -> Option<ProtectedAction> {
        let was_open = self.gate.is_prompt_open();
        let dropped = self.gate.cancel();
        if was_open {
            self.emit(DashboardEvent::AuthPromptClosed);
        }
        debug!(dropped = ?dropped.map(ProtectedAction::name), "dispatch: authentication cancelled");
        dropped
    }

    pub fn update_field(&mut self, field: DraftField, value: impl Into<String>) -> DashboardResult<()> {
        let result = self.creation.update_field(field, value);
        result.map_err(|err| self.surface(err))
    }

    /// Discards the open form without submitting it.
    pub fn close_form(&mut self) -> Option<Draft> {
        let closed = self.creation.close();
        if let Some(draft) = &closed {
            self.emit(DashboardEvent::FormClosed(draft.kind()));
        }
        closed
    }

    pub async fn submit(&mut self) -> DashboardResult<SubmitOutcome> {
        let result = self
            .creation
            .submit(self.service.as_ref(), self.sync.as_ref())
            .await;
        let outcome = result.map_err(|err| self.surface(err))?;

        let kind = outcome.entity.kind();
        self.emit(DashboardEvent::EntityCreated(kind));
        self.emit(DashboardEvent::FormClosed(kind));
        if let Err(err) = &outcome.resync {
            self.surface(err.clone());
        } else if let Ok(RefreshOutcome::Applied { .. }) = &outcome.resync {
            self.emit_synced().await;
        }
        Ok(outcome)
    }

    async fn finish_authentication(
        &mut self,
        result: DashboardResult<Option<ProtectedAction>>,
    ) -> DashboardResult<AuthOutcome> {
        let replayed = result.map_err(|err| self.surface(err))?;
        self.last_error = None;
        self.emit(DashboardEvent::Authenticated);
        self.emit(DashboardEvent::AuthPromptClosed);

        let replay = match replayed {
            Some(action) => {
                info!(action = action.name(), "dispatch: replaying deferred action");
                self.execute(action).await
            }
            None => Ok(()),
        };
        Ok(AuthOutcome { replayed, replay })
    }

    async fn execute(&mut self, action: ProtectedAction) -> DashboardResult<()> {
        match action.effect() {
            ActionEffect::Reassign => self.reassign().await,
            ActionEffect::OpenForm(kind) => {
                if let Some(discarded) = self.creation.open_form(kind) {
                    debug!(kind = %discarded.kind(), "dispatch: discarded unsent draft");
                }
                self.emit(DashboardEvent::FormOpened(kind));
                Ok(())
            }
        }
    }

    async fn reassign(&mut self) -> DashboardResult<()> {
        let sync = Arc::clone(&self.sync);
        let _loading = sync.begin_loading();

        if let Err(err) = self.service.reassign().await {
            return Err(self.surface(err));
        }
        info!("dispatch: tasks reassigned");
        self.emit(DashboardEvent::Reassigned);

        let refreshed = sync.refresh().await;
        self.record_refresh(refreshed).await.map(|_| ())
    }

    async fn record_refresh(
        &mut self,
        result: DashboardResult<RefreshOutcome>,
    ) -> DashboardResult<RefreshOutcome> {
        match result {
            Ok(outcome @ RefreshOutcome::Applied { .. }) => {
                self.emit_synced().await;
                Ok(outcome)
            }
            Ok(outcome) => Ok(outcome),
            Err(err) => Err(self.surface(err)),
        }
    }

    async fn emit_synced(&self) {
        let snapshot = self.sync.snapshot().await;
        self.emit(DashboardEvent::Synced {
            seq: snapshot.seq,
            participants: snapshot.assignment.len(),
            reassignment_day: snapshot.reassignment_day,
        });
    }

    fn surface(&mut self, err: DashboardError) -> DashboardError {
        warn!(kind = ?err.kind(), error = %err, "dispatch: operation failed");
        self.last_error = Some(err.message().to_string());
        self.emit(DashboardEvent::Error {
            kind: err.kind(),
            message: err.message().to_string(),
        });
        err
    }

    fn emit(&self, event: DashboardEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
