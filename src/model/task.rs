use std::fmt;
use std::str::FromStr;

use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable task identifier, generated when the task is created.
///
/// Row order in a project is display order only; every mutation addresses
/// a task by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        TaskId(Uuid::new_v4())
    }

    /// First 8 hex digits, enough to address a task from the CLI
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }

    /// Whether `prefix` (case-insensitive, hyphens ignored) matches this id
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        let wanted: String = prefix
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        !wanted.is_empty() && self.0.simple().to_string().starts_with(&wanted)
    }
}

impl Default for TaskId {
    fn default() -> Self {
        TaskId::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(TaskId)
    }
}

/// A single row in a project's task table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Records persisted before ids existed get a fresh one on load
    #[serde(default)]
    pub id: TaskId,
    pub title: String,
    /// Free-form date label, e.g. `21.11.2024`
    pub created: String,
    pub completed: bool,
}

impl Task {
    pub fn new(title: impl Into<String>, created: impl Into<String>, completed: bool) -> Self {
        Task {
            id: TaskId::new(),
            title: title.into(),
            created: created.into(),
            completed,
        }
    }

    /// Current text value of an editable cell
    pub fn field(&self, field: TaskField) -> &str {
        match field {
            TaskField::Title => &self.title,
            TaskField::Created => &self.created,
        }
    }

    /// Merge the fields set in `patch` into this task
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(created) = &patch.created {
            self.created = created.clone();
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }
}

/// Today's date in the `DD.MM.YYYY` form used by [`Task::created`]
pub fn today_label() -> String {
    Local::now().format("%d.%m.%Y").to_string()
}

/// Text cells of the task table that can be edited inline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskField {
    Title,
    Created,
}

impl TaskField {
    pub const ALL: [TaskField; 2] = [TaskField::Title, TaskField::Created];

    pub fn name(self) -> &'static str {
        match self {
            TaskField::Title => "title",
            TaskField::Created => "created",
        }
    }
}

/// Partial update for a task; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub created: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Patch that sets a single text field
    pub fn field(field: TaskField, value: String) -> Self {
        match field {
            TaskField::Title => TaskPatch {
                title: Some(value),
                ..Default::default()
            },
            TaskField::Created => TaskPatch {
                created: Some(value),
                ..Default::default()
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.created.is_none() && self.completed.is_none()
    }
}
