use super::{finish, normalize, reject, required, rule_errors, IdInput, INVALID_CHOICE};
use crate::error::AppError;
use crate::models::{NewTask, Priority};
use crate::store::Store;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Formats a `datetime-local` input submits.
const DEADLINE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Submitted task fields, create and update alike.
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct TaskForm {
    #[validate(length(max = 255, message = "Ensure this value has at most 255 characters."))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<String>,
    pub priority: Option<String>,
    pub task_type: Option<IdInput>,
    #[serde(default)]
    pub assignees: Vec<IdInput>,
    #[serde(default)]
    pub is_completed: bool,
}

/// Naive inputs are taken as UTC; RFC 3339 keeps its own offset.
pub fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DEADLINE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

impl TaskForm {
    /// Validates every field, resolving `task_type` and `assignees` against
    /// the store. Returns the complete error mapping on failure.
    pub async fn clean(&self, store: &dyn Store) -> Result<NewTask, AppError> {
        let mut errors = rule_errors(self);

        let name = required(&mut errors, "name", normalize(&self.name));
        let description = required(&mut errors, "description", normalize(&self.description));

        let deadline = match required(&mut errors, "deadline", normalize(&self.deadline)) {
            Some(raw) => {
                let parsed = parse_deadline(&raw);
                if parsed.is_none() {
                    reject(&mut errors, "deadline", "Enter a valid date/time.");
                }
                parsed
            }
            None => None,
        };

        let priority = match normalize(&self.priority) {
            None => Some(Priority::default()),
            Some(raw) => match raw.parse::<Priority>() {
                Ok(priority) => Some(priority),
                Err(message) => {
                    reject(&mut errors, "priority", message);
                    None
                }
            },
        };

        let task_type_id = match self.task_type.as_ref().filter(|raw| !raw.is_blank()) {
            None => {
                reject(&mut errors, "task_type", super::REQUIRED);
                None
            }
            Some(raw) => {
                let found = match raw.parse() {
                    Some(id) => store.get_task_type(id).await?.map(|task_type| task_type.id),
                    None => None,
                };
                if found.is_none() {
                    reject(&mut errors, "task_type", INVALID_CHOICE);
                }
                found
            }
        };

        let mut assignees = Vec::with_capacity(self.assignees.len());
        if self.assignees.iter().all(IdInput::is_blank) {
            reject(&mut errors, "assignees", super::REQUIRED);
        }
        for raw in self.assignees.iter().filter(|raw| !raw.is_blank()) {
            let Some(id) = raw.parse() else {
                reject(&mut errors, "assignees", "Enter a list of values.");
                continue;
            };
            if store.get_worker(id).await?.is_some() {
                assignees.push(id);
            } else {
                reject(
                    &mut errors,
                    "assignees",
                    format!(
                        "Select a valid choice. {} is not one of the available choices.",
                        id
                    ),
                );
            }
        }
        assignees.sort_unstable();
        assignees.dedup();

        let cleaned = match (name, description, deadline, priority, task_type_id) {
            (Some(name), Some(description), Some(deadline), Some(priority), Some(task_type_id)) => {
                Some(NewTask {
                    name,
                    description,
                    deadline,
                    is_completed: self.is_completed,
                    priority,
                    task_type_id,
                    assignees,
                })
            }
            _ => None,
        };
        finish(errors, cleaned)
    }
}
