use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque ID type (ULID string)
pub type TaskId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub assigned_to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub status: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /tasks`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub assigned_to: String,
    pub due_date: Option<DateTime<Utc>>,
    pub status: String,
    pub tags: Vec<String>,
}

/// Body of `PUT /tasks/{id}`. A missing `status` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusUpdate {
    pub status: String,
}
