//! Client-side orchestration for the chore dashboard: keeps a local view of the
//! remote assignments, gates mutations behind operator credentials, and drives the
//! participant/task creation forms.

pub mod auth;
pub mod creation;
pub mod dispatcher;
pub mod service;
pub mod sync;
pub mod view;

pub use auth::{
    AuthGate, CredentialVerifier, Credentials, MissingCredentialVerifier,
    StaticCredentialVerifier,
};
pub use creation::{CreationWorkflow, Draft, DraftField, EntityKind, NewEntity, SubmitOutcome};
pub use dispatcher::{
    ActionDispatcher, AuthOutcome, DashboardEvent, ProtectedAction, RequestOutcome,
};
pub use service::{HttpTaskService, TaskService};
pub use shared::error::{DashboardError, DashboardResult, ErrorKind};
pub use sync::{RefreshOutcome, SyncController, SyncSnapshot};
pub use view::{DisplayRow, ViewModel};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
