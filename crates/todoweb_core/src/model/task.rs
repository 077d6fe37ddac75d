use crate::error::AppError;
use serde::{Deserialize, Serialize};

pub const TITLE_REQUIRED: &str = "Title is required";

/// A task as the remote store returns it. The client only ever holds a copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Task {
    pub fn status(&self) -> TaskStatus {
        if self.completed {
            TaskStatus::Completed
        } else {
            TaskStatus::Pending
        }
    }

    /// The description, if it has any visible content.
    pub fn description_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Pending => "status-pending",
            Self::Completed => "status-completed",
        }
    }
}

/// Body of a create request. Only constructible with a non-blank title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTask {
    title: String,
    description: String,
}

impl NewTask {
    pub fn new(title: &str, description: &str) -> Result<Self, AppError> {
        Ok(Self {
            title: required_title(title)?,
            description: description.trim().to_string(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Body of an update request. Same title rule as [`NewTask`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskUpdate {
    title: String,
    description: String,
    completed: bool,
}

impl TaskUpdate {
    pub fn new(title: &str, description: &str, completed: bool) -> Result<Self, AppError> {
        Ok(Self {
            title: required_title(title)?,
            description: description.trim().to_string(),
            completed,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn completed(&self) -> bool {
        self.completed
    }
}

fn required_title(title: &str) -> Result<String, AppError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input(TITLE_REQUIRED));
    }
    Ok(trimmed.to_string())
}
