use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "No Title";
pub const DEFAULT_NOTES: &str = "No Notes";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn from_api(value: Option<&str>) -> Self {
        match value {
            Some("completed") => TaskStatus::Completed,
            _ => TaskStatus::Pending,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskList {
    pub id: String,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub list_id: String,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub status: TaskStatus,
    /// Completion timestamp as reported by the remote source.
    pub completed_at: Option<String>,
}

impl Task {
    /// No completion timestamp set; the status field is not consulted.
    pub fn is_pending(&self) -> bool {
        self.completed_at.is_none()
    }

    /// Blank titles count as missing so no reminder is ever created untitled.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or(DEFAULT_TITLE)
    }

    pub fn display_notes(&self) -> &str {
        self.notes.as_deref().unwrap_or(DEFAULT_NOTES)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reminder {
    pub title: String,
    pub body: Option<String>,
    pub completed: bool,
    pub list: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AccountBinding {
    pub email: String,
    pub list: String,
}
