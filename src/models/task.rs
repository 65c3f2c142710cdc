use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum; the wire and storage form is
/// the capitalized variant name.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default, sqlx::Type)]
#[sqlx(type_name = "task_priority")]
pub enum Priority {
    Urgent,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Urgent,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Urgent => "Urgent",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Select a valid choice. {} is not one of the available choices.",
                    s
                )
            })
    }
}

/// A unit of work with a deadline, a type and any number of assignees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub is_completed: bool,
    pub priority: Priority,
    pub task_type_id: i64,
    /// Worker ids, ascending, no duplicates.
    pub assignees: Vec<i64>,
}

impl Task {
    pub fn absolute_url(&self) -> String {
        format!("/tasks/{}/", self.id)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.priority)
    }
}

/// A validated task ready to be inserted or to replace an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub name: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub is_completed: bool,
    pub priority: Priority,
    pub task_type_id: i64,
    pub assignees: Vec<i64>,
}

impl NewTask {
    pub fn into_task(mut self, id: i64) -> Task {
        self.assignees.sort_unstable();
        self.assignees.dedup();
        Task {
            id,
            name: self.name,
            description: self.description,
            deadline: self.deadline,
            is_completed: self.is_completed,
            priority: self.priority,
            task_type_id: self.task_type_id,
            assignees: self.assignees,
        }
    }
}
