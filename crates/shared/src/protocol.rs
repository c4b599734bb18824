use serde::{Deserialize, Serialize};

use crate::domain::{NewParticipant, NewTask, ParticipantId, TaskId};

pub const TASKS_PATH: &str = "tasks";
pub const REASSIGNMENT_DAY_PATH: &str = "is-saturday";
pub const REASSIGN_PATH: &str = "update-tasks";
pub const ADD_PARTICIPANT_PATH: &str = "add-student";
pub const ADD_TASK_PATH: &str = "add-task";

/// Header carrying the optional API key on mutation endpoints.
pub const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignmentDayResponse {
    pub is_saturday: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddParticipantRequest {
    pub id: ParticipantId,
    pub name: String,
}

impl From<&NewParticipant> for AddParticipantRequest {
    fn from(value: &NewParticipant) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTaskRequest {
    pub id: TaskId,
    pub name: String,
    #[serde(rename = "baseValue")]
    pub base_value: i64,
}

impl From<&NewTask> for AddTaskRequest {
    fn from(value: &NewTask) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            base_value: value.base_value,
        }
    }
}
