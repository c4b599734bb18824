use std::fmt;

use serde::{
    de::{MapAccess, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ParticipantId);
id_newtype!(TaskId);

/// The work currently assigned to one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDescriptor {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TaskDescriptor {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// The backend sends either a bare label string or a `{label, description}` object.
#[derive(Deserialize)]
#[serde(untagged)]
enum TaskDescriptorRepr {
    Label(String),
    Detailed {
        label: String,
        #[serde(default)]
        description: Option<String>,
    },
}

impl<'de> Deserialize<'de> for TaskDescriptor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match TaskDescriptorRepr::deserialize(deserializer)? {
            TaskDescriptorRepr::Label(label) => TaskDescriptor::new(label),
            TaskDescriptorRepr::Detailed { label, description } => {
                TaskDescriptor { label, description }
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentEntry {
    pub participant: String,
    pub task: TaskDescriptor,
}

/// Participant name to task descriptor, in the order the backend listed them.
///
/// Names are unique: inserting an existing name replaces its task but keeps the
/// original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    entries: Vec<AssignmentEntry>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, participant: impl Into<String>, task: TaskDescriptor) {
        let participant = participant.into();
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.participant == participant)
        {
            Some(existing) => existing.task = task,
            None => self.entries.push(AssignmentEntry { participant, task }),
        }
    }

    pub fn get(&self, participant: &str) -> Option<&TaskDescriptor> {
        self.entries
            .iter()
            .find(|entry| entry.participant == participant)
            .map(|entry| &entry.task)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssignmentEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Assignment {
    type Item = &'a AssignmentEntry;
    type IntoIter = std::slice::Iter<'a, AssignmentEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<P: Into<String>> FromIterator<(P, TaskDescriptor)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (P, TaskDescriptor)>>(iter: I) -> Self {
        let mut assignment = Assignment::new();
        for (participant, task) in iter {
            assignment.insert(participant, task);
        }
        assignment
    }
}

impl Serialize for Assignment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(
            self.entries
                .iter()
                .map(|entry| (&entry.participant, &entry.task)),
        )
    }
}

struct AssignmentVisitor;

impl<'de> Visitor<'de> for AssignmentVisitor {
    type Value = Assignment;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of participant names to task descriptors")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut assignment = Assignment {
            entries: Vec::with_capacity(access.size_hint().unwrap_or(0)),
        };
        while let Some((participant, task)) = access.next_entry::<String, TaskDescriptor>()? {
            assignment.insert(participant, task);
        }
        Ok(assignment)
    }
}

impl<'de> Deserialize<'de> for Assignment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(AssignmentVisitor)
    }
}

/// A participant ready to be registered with the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewParticipant {
    pub id: ParticipantId,
    pub name: String,
}

/// A task definition ready to be registered with the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub id: TaskId,
    pub name: String,
    pub base_value: i64,
}
