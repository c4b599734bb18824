use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    domain::{Assignment, NewParticipant, NewTask, TaskDescriptor},
    error::{DashboardError, DashboardResult},
};
use tokio::sync::Mutex;

use crate::service::TaskService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ServiceCall {
    FetchAssignments,
    FetchReassignmentDay,
    Reassign,
    AddParticipant(NewParticipant),
    AddTask(NewTask),
}

/// In-memory task service that records every call.
pub(crate) struct FakeTaskService {
    assignment: Mutex<Assignment>,
    reassignment_day: Mutex<bool>,
    after_reassign: Mutex<Option<Assignment>>,
    fail_fetch: Mutex<Option<DashboardError>>,
    fail_flag: Mutex<Option<DashboardError>>,
    fail_mutation: Mutex<Option<DashboardError>>,
    pub(crate) calls: Arc<Mutex<Vec<ServiceCall>>>,
}

impl FakeTaskService {
    pub(crate) fn with_assignment(assignment: Assignment) -> Self {
        Self {
            assignment: Mutex::new(assignment),
            reassignment_day: Mutex::new(false),
            after_reassign: Mutex::new(None),
            fail_fetch: Mutex::new(None),
            fail_flag: Mutex::new(None),
            fail_mutation: Mutex::new(None),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn alice_and_bob() -> Self {
        Self::with_assignment(assignment(&[("Alice", "Dishes"), ("Bob", "Trash")]))
    }

    pub(crate) async fn set_reassignment_day(&self, value: bool) {
        *self.reassignment_day.lock().await = value;
    }

    pub(crate) async fn set_after_reassign(&self, next: Assignment) {
        *self.after_reassign.lock().await = Some(next);
    }

    pub(crate) async fn fail_fetch_with(&self, err: Option<DashboardError>) {
        *self.fail_fetch.lock().await = err;
    }

    pub(crate) async fn fail_flag_with(&self, err: Option<DashboardError>) {
        *self.fail_flag.lock().await = err;
    }

    pub(crate) async fn fail_mutation_with(&self, err: Option<DashboardError>) {
        *self.fail_mutation.lock().await = err;
    }

    pub(crate) async fn insert(&self, participant: &str, label: &str) {
        self.assignment
            .lock()
            .await
            .insert(participant, TaskDescriptor::new(label));
    }

    pub(crate) async fn recorded(&self) -> Vec<ServiceCall> {
        self.calls.lock().await.clone()
    }

    pub(crate) async fn mutation_count(&self) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    ServiceCall::Reassign | ServiceCall::AddParticipant(_) | ServiceCall::AddTask(_)
                )
            })
            .count()
    }

    async fn record(&self, call: ServiceCall) {
        self.calls.lock().await.push(call);
    }

    async fn mutation_result(&self) -> DashboardResult<()> {
        match self.fail_mutation.lock().await.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TaskService for FakeTaskService {
    async fn fetch_assignments(&self) -> DashboardResult<Assignment> {
        self.record(ServiceCall::FetchAssignments).await;
        if let Some(err) = self.fail_fetch.lock().await.clone() {
            return Err(err);
        }
        Ok(self.assignment.lock().await.clone())
    }

    async fn fetch_reassignment_day(&self) -> DashboardResult<bool> {
        self.record(ServiceCall::FetchReassignmentDay).await;
        if let Some(err) = self.fail_flag.lock().await.clone() {
            return Err(err);
        }
        Ok(*self.reassignment_day.lock().await)
    }

    async fn reassign(&self) -> DashboardResult<()> {
        self.record(ServiceCall::Reassign).await;
        self.mutation_result().await?;
        if let Some(next) = self.after_reassign.lock().await.take() {
            *self.assignment.lock().await = next;
        }
        Ok(())
    }

    async fn add_participant(&self, participant: &NewParticipant) -> DashboardResult<()> {
        self.record(ServiceCall::AddParticipant(participant.clone()))
            .await;
        self.mutation_result().await
    }

    async fn add_task(&self, task: &NewTask) -> DashboardResult<()> {
        self.record(ServiceCall::AddTask(task.clone())).await;
        self.mutation_result().await
    }
}

pub(crate) fn assignment(pairs: &[(&str, &str)]) -> Assignment {
    pairs
        .iter()
        .map(|(participant, label)| (*participant, TaskDescriptor::new(*label)))
        .collect()
}
