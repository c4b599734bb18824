use std::collections::VecDeque;

use async_trait::async_trait;
use shared::{
    domain::{NewParticipant, NewTask},
    error::DashboardError,
};
use tokio::sync::Notify;

use super::*;
use crate::test_support::{assignment, FakeTaskService, ServiceCall};

#[tokio::test]
async fn refresh_applies_assignment_and_flag_together() {
    let service = Arc::new(FakeTaskService::alice_and_bob());
    service.set_reassignment_day(true).await;
    let sync = SyncController::new(service.clone());

    let outcome = sync.refresh().await.expect("refresh");
    assert_eq!(outcome, RefreshOutcome::Applied { seq: 1 });

    let snapshot = sync.snapshot().await;
    assert_eq!(
        *snapshot.assignment,
        assignment(&[("Alice", "Dishes"), ("Bob", "Trash")])
    );
    assert!(snapshot.reassignment_day);
    assert_eq!(sync.last_synced_seq().await, 1);
    assert!(!sync.is_loading());

    let calls = service.recorded().await;
    assert!(calls.contains(&ServiceCall::FetchAssignments));
    assert!(calls.contains(&ServiceCall::FetchReassignmentDay));
}

#[tokio::test]
async fn failed_flag_fetch_applies_nothing() {
    let service = Arc::new(FakeTaskService::alice_and_bob());
    let sync = SyncController::new(service.clone());
    sync.refresh().await.expect("first refresh");

    service.insert("Carol", "Sweep").await;
    service.set_reassignment_day(true).await;
    service
        .fail_flag_with(Some(DashboardError::network(
            "Failed to fetch Saturday status: HTTP 503 Service Unavailable",
        )))
        .await;

    let err = sync.refresh().await.expect_err("must fail");
    assert_eq!(err.kind(), shared::error::ErrorKind::Network);
    assert!(err.message().contains("Saturday"));

    let snapshot = sync.snapshot().await;
    assert_eq!(snapshot.assignment.len(), 2);
    assert!(!snapshot.reassignment_day);
    assert_eq!(snapshot.seq, 1);
    assert!(!sync.is_loading());
}

#[tokio::test]
async fn failed_assignment_fetch_leaves_empty_state() {
    let service = Arc::new(FakeTaskService::alice_and_bob());
    service
        .fail_fetch_with(Some(DashboardError::network("Failed to fetch tasks: connection refused")))
        .await;
    let sync = SyncController::new(service);

    assert!(sync.refresh().await.is_err());
    assert!(sync.view().await.is_empty());
    assert_eq!(sync.last_synced_seq().await, 0);
    assert!(!sync.is_loading());
}

/// Serves canned assignments in order; a response with a gate waits for it.
struct GatedService {
    responses: Mutex<VecDeque<(Assignment, Option<Arc<Notify>>)>>,
}

#[async_trait]
impl TaskService for GatedService {
    async fn fetch_assignments(&self) -> DashboardResult<Assignment> {
        let (assignment, gate) = self
            .responses
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| DashboardError::network("no canned response"))?;
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(assignment)
    }

    async fn fetch_reassignment_day(&self) -> DashboardResult<bool> {
        Ok(false)
    }

    async fn reassign(&self) -> DashboardResult<()> {
        Ok(())
    }

    async fn add_participant(&self, _participant: &NewParticipant) -> DashboardResult<()> {
        Ok(())
    }

    async fn add_task(&self, _task: &NewTask) -> DashboardResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn stale_refresh_completing_late_is_discarded() {
    let gate = Arc::new(Notify::new());
    let service = Arc::new(GatedService {
        responses: Mutex::new(VecDeque::from([
            (assignment(&[("Alice", "Old")]), Some(gate.clone())),
            (assignment(&[("Alice", "New")]), None),
        ])),
    });
    let sync = SyncController::new(service);

    let slow = sync.refresh();
    let fast = async {
        let outcome = sync.refresh().await;
        assert!(sync.is_loading(), "slow refresh is still in flight");
        gate.notify_one();
        outcome
    };
    let (slow, fast) = tokio::join!(slow, fast);

    assert_eq!(fast.expect("fast"), RefreshOutcome::Applied { seq: 2 });
    assert_eq!(
        slow.expect("slow"),
        RefreshOutcome::Superseded { seq: 1, applied: 2 }
    );
    let snapshot = sync.snapshot().await;
    assert_eq!(
        snapshot.assignment.get("Alice").map(|task| task.label.as_str()),
        Some("New")
    );
    assert!(!sync.is_loading());
}

#[tokio::test]
async fn loading_guard_releases_on_drop() {
    let sync = SyncController::new(Arc::new(FakeTaskService::alice_and_bob()));
    {
        let _first = sync.begin_loading();
        let _second = sync.begin_loading();
        assert!(sync.is_loading());
    }
    assert!(!sync.is_loading());
}
