//! Form validation: raw submitted values in, typed values or a
//! field → message mapping out.
//!
//! Text inputs are trimmed and an empty string counts as "not submitted".
//! Every form collects all of its errors before failing, so the caller sees
//! the complete mapping in one response.

pub mod catalog;
pub mod search;
pub mod task;
pub mod worker;

pub use catalog::{PositionForm, TaskTypeForm};
pub use search::{StatusFilter, TaskNameSearchForm, TaskStatusFilterForm, WorkerUsernameSearchForm};
pub use task::TaskForm;
pub use worker::{WorkerCreationForm, WorkerProfileForm};

use crate::error::{field_errors, AppError, FieldErrors};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// A reference to another entity, as submitted. Clients send either a JSON
/// number or the string form used by HTML selects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdInput {
    Int(i64),
    Text(String),
}

impl IdInput {
    pub fn parse(&self) -> Option<i64> {
        match self {
            IdInput::Int(id) => Some(*id),
            IdInput::Text(raw) => raw.trim().parse().ok(),
        }
    }

    /// A blank select submits an empty string.
    pub fn is_blank(&self) -> bool {
        matches!(self, IdInput::Text(raw) if raw.trim().is_empty())
    }
}

impl From<i64> for IdInput {
    fn from(id: i64) -> Self {
        IdInput::Int(id)
    }
}

/// Trimmed value, or `None` when absent or blank.
pub(crate) fn normalize(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Runs the declarative `validator` rules and returns whatever they reject.
pub(crate) fn rule_errors<T: Validate>(form: &T) -> FieldErrors {
    match form.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => field_errors(&errors),
    }
}

/// Records `message` for `field` unless an earlier rule already did.
pub(crate) fn reject(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors
        .entry(field.to_string())
        .or_insert_with(|| message.into());
}

pub(crate) fn required(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    if value.is_none() {
        reject(errors, field, REQUIRED);
    }
    value
}

/// Turns accumulated errors into the final result.
pub(crate) fn finish<T>(errors: FieldErrors, cleaned: Option<T>) -> Result<T, AppError> {
    match cleaned {
        Some(value) if errors.is_empty() => Ok(value),
        _ => Err(AppError::ValidationError(errors)),
    }
}
