use shared::domain::AssignmentEntry;

use crate::sync::SyncSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRow<'a> {
    pub participant: &'a str,
    pub task_label: &'a str,
    pub task_description: Option<&'a str>,
}

impl<'a> DisplayRow<'a> {
    pub fn as_tuple(&self) -> (&'a str, &'a str, Option<&'a str>) {
        (self.participant, self.task_label, self.task_description)
    }
}

impl<'a> From<&'a AssignmentEntry> for DisplayRow<'a> {
    fn from(entry: &'a AssignmentEntry) -> Self {
        Self {
            participant: &entry.participant,
            task_label: &entry.task.label,
            task_description: entry.task.description.as_deref(),
        }
    }
}

/// Read-only projection of one sync snapshot.
#[derive(Debug, Clone, Default)]
pub struct ViewModel {
    snapshot: SyncSnapshot,
}

impl ViewModel {
    pub fn new(snapshot: SyncSnapshot) -> Self {
        Self { snapshot }
    }

    /// Rows in the order the service listed the participants. Each call starts over.
    pub fn rows(&self) -> impl Iterator<Item = DisplayRow<'_>> + Clone + '_ {
        self.snapshot.assignment.iter().map(DisplayRow::from)
    }

    pub fn len(&self) -> usize {
        self.snapshot.assignment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.assignment.is_empty()
    }

    pub fn is_reassignment_day(&self) -> bool {
        self.snapshot.reassignment_day
    }

    pub fn has_synced(&self) -> bool {
        self.snapshot.seq > 0
    }
}
