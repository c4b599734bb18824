//! Draft, validate and submit new participants and tasks.

use std::{fmt, str::FromStr};

use shared::{
    domain::{NewParticipant, NewTask, ParticipantId, TaskId},
    error::{DashboardError, DashboardResult},
};
use tracing::info;

use crate::{
    service::TaskService,
    sync::{RefreshOutcome, SyncController},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Participant,
    Task,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Participant => "student",
            Self::Task => "task",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Id,
    Name,
    BaseValue,
}

impl FromStr for DraftField {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "base_value" | "base-value" | "basevalue" => Ok(Self::BaseValue),
            other => Err(DashboardError::validation(format!("unknown field '{other}'"))),
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::BaseValue => "base_value",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantDraft {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub id: String,
    pub name: String,
    pub base_value: String,
}

/// Raw form input, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draft {
    Participant(ParticipantDraft),
    Task(TaskDraft),
}

impl Draft {
    fn empty(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Participant => Self::Participant(ParticipantDraft::default()),
            EntityKind::Task => Self::Task(TaskDraft::default()),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Participant(_) => EntityKind::Participant,
            Self::Task(_) => EntityKind::Task,
        }
    }

    fn field_mut(&mut self, field: DraftField) -> Option<&mut String> {
        match (self, field) {
            (Self::Participant(draft), DraftField::Id) => Some(&mut draft.id),
            (Self::Participant(draft), DraftField::Name) => Some(&mut draft.name),
            (Self::Participant(_), DraftField::BaseValue) => None,
            (Self::Task(draft), DraftField::Id) => Some(&mut draft.id),
            (Self::Task(draft), DraftField::Name) => Some(&mut draft.name),
            (Self::Task(draft), DraftField::BaseValue) => Some(&mut draft.base_value),
        }
    }

    pub fn validate(&self) -> DashboardResult<NewEntity> {
        match self {
            Self::Participant(draft) => Ok(NewEntity::Participant(NewParticipant {
                id: ParticipantId(parse_integer(DraftField::Id, &draft.id)?),
                name: require_name(&draft.name)?,
            })),
            Self::Task(draft) => Ok(NewEntity::Task(NewTask {
                id: TaskId(parse_integer(DraftField::Id, &draft.id)?),
                name: require_name(&draft.name)?,
                base_value: parse_integer(DraftField::BaseValue, &draft.base_value)?,
            })),
        }
    }
}

fn parse_integer(field: DraftField, raw: &str) -> DashboardResult<i64> {
    raw.trim().parse::<i64>().map_err(|_| {
        DashboardError::validation(format!("{field} must be a whole number, got '{raw}'"))
    })
}

fn require_name(raw: &str) -> DashboardResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DashboardError::validation("name must not be empty"));
    }
    Ok(name.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewEntity {
    Participant(NewParticipant),
    Task(NewTask),
}

impl NewEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Participant(_) => EntityKind::Participant,
            Self::Task(_) => EntityKind::Task,
        }
    }
}

/// A write that reached the service. `resync` is the follow-up refresh, which can
/// fail on its own without undoing the write.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub entity: NewEntity,
    pub resync: DashboardResult<RefreshOutcome>,
}

#[derive(Debug, Default)]
pub struct CreationWorkflow {
    draft: Option<Draft>,
}

impl CreationWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_kind(&self) -> Option<EntityKind> {
        self.draft.as_ref().map(Draft::kind)
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    /// Starts a blank form for `kind`, returning whatever draft it replaced.
    pub fn open_form(&mut self, kind: EntityKind) -> Option<Draft> {
        self.draft.replace(Draft::empty(kind))
    }

    pub fn close(&mut self) -> Option<Draft> {
        self.draft.take()
    }

    pub fn update_field(&mut self, field: DraftField, value: impl Into<String>) -> DashboardResult<()> {
        let draft = self
            .draft
            .as_mut()
            .ok_or_else(|| DashboardError::validation("no form is open"))?;
        let kind = draft.kind();
        let slot = draft.field_mut(field).ok_or_else(|| {
            DashboardError::validation(format!("the {kind} form has no '{field}' field"))
        })?;
        *slot = value.into();
        Ok(())
    }

    pub fn validate(&self) -> DashboardResult<NewEntity> {
        self.draft
            .as_ref()
            .ok_or_else(|| DashboardError::validation("no form is open"))?
            .validate()
    }

    /// Validates and posts the draft. A rejected write leaves the draft in place; an
    /// accepted one closes the form and resyncs.
    pub async fn submit(
        &mut self,
        service: &dyn TaskService,
        sync: &SyncController,
    ) -> DashboardResult<SubmitOutcome> {
        let entity = self.validate()?;
        match &entity {
            NewEntity::Participant(participant) => service.add_participant(participant).await?,
            NewEntity::Task(task) => service.add_task(task).await?,
        }

        self.draft = None;
        info!(kind = %entity.kind(), "creation: entity registered");
        let resync = sync.refresh().await;
        Ok(SubmitOutcome { entity, resync })
    }
}

#[cfg(test)]
#[path = "tests/creation_tests.rs"]
mod tests;
