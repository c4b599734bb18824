//! Keeps the local assignment view in step with the task service.

use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Arc,
};

use shared::{domain::Assignment, error::DashboardResult};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{service::TaskService, view::ViewModel};

/// The last applied refresh. `seq == 0` means nothing has been applied yet.
#[derive(Debug, Clone, Default)]
pub struct SyncSnapshot {
    pub assignment: Arc<Assignment>,
    pub reassignment_day: bool,
    pub seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { seq: u64 },
    /// A newer refresh was applied first; this result was dropped.
    Superseded { seq: u64, applied: u64 },
}

/// Holds the loading indicator up until dropped.
pub struct LoadingGuard<'a> {
    in_flight: &'a AtomicUsize,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(in_flight: &'a AtomicUsize) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        Self { in_flight }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct SyncController {
    service: Arc<dyn TaskService>,
    snapshot: Mutex<SyncSnapshot>,
    in_flight: AtomicUsize,
    next_seq: AtomicU64,
}

impl SyncController {
    pub fn new(service: Arc<dyn TaskService>) -> Arc<Self> {
        Arc::new(Self {
            service,
            snapshot: Mutex::new(SyncSnapshot::default()),
            in_flight: AtomicUsize::new(0),
            next_seq: AtomicU64::new(0),
        })
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Marks the dashboard busy for the lifetime of the returned guard.
    pub fn begin_loading(&self) -> LoadingGuard<'_> {
        LoadingGuard::acquire(&self.in_flight)
    }

    pub async fn snapshot(&self) -> SyncSnapshot {
        self.snapshot.lock().await.clone()
    }

    pub async fn view(&self) -> ViewModel {
        ViewModel::new(self.snapshot().await)
    }

    pub async fn last_synced_seq(&self) -> u64 {
        self.snapshot.lock().await.seq
    }

    /// Fetches assignments and the reassignment-day flag and applies both together.
    ///
    /// Nothing is applied unless both fetches succeed. Overlapping calls are allowed;
    /// a result older than the one already applied is discarded.
    pub async fn refresh(&self) -> DashboardResult<RefreshOutcome> {
        let _loading = self.begin_loading();
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(seq, "sync: refresh started");

        let (assignment, reassignment_day) = futures::try_join!(
            self.service.fetch_assignments(),
            self.service.fetch_reassignment_day()
        )
        .inspect_err(|err| warn!(seq, error = %err, "sync: refresh failed"))?;

        let mut current = self.snapshot.lock().await;
        if seq <= current.seq {
            warn!(seq, applied = current.seq, "sync: discarding stale refresh");
            return Ok(RefreshOutcome::Superseded {
                seq,
                applied: current.seq,
            });
        }

        info!(
            seq,
            participants = assignment.len(),
            reassignment_day,
            "sync: state refreshed"
        );
        *current = SyncSnapshot {
            assignment: Arc::new(assignment),
            reassignment_day,
            seq,
        };
        Ok(RefreshOutcome::Applied { seq })
    }
}

#[cfg(test)]
#[path = "tests/sync_tests.rs"]
mod tests;
