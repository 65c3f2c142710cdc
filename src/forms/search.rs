//! The small GET forms behind the listing filters.
//!
//! A search form that fails validation does not fail the request; the
//! listing treats that axis as unfiltered.

use super::{normalize, reject, rule_errors};
use crate::error::FieldErrors;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    Completed,
    Pending,
}

impl StatusFilter {
    pub fn is_completed(self) -> bool {
        matches!(self, StatusFilter::Completed)
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct TaskNameSearchForm {
    #[validate(length(max = 255, message = "Ensure this value has at most 255 characters."))]
    pub name: Option<String>,
}

impl TaskNameSearchForm {
    /// The search term, or `None` for "match everything".
    pub fn clean(&self) -> Result<Option<String>, FieldErrors> {
        let errors = rule_errors(self);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(normalize(&self.name))
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct TaskStatusFilterForm {
    pub status: Option<String>,
}

impl TaskStatusFilterForm {
    pub fn clean(&self) -> Result<Option<StatusFilter>, FieldErrors> {
        match normalize(&self.status).as_deref() {
            None => Ok(None),
            Some("completed") => Ok(Some(StatusFilter::Completed)),
            Some("pending") => Ok(Some(StatusFilter::Pending)),
            Some(other) => {
                let mut errors = FieldErrors::new();
                reject(
                    &mut errors,
                    "status",
                    format!(
                        "Select a valid choice. {} is not one of the available choices.",
                        other
                    ),
                );
                Err(errors)
            }
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct WorkerUsernameSearchForm {
    #[validate(length(max = 255, message = "Ensure this value has at most 255 characters."))]
    pub username: Option<String>,
}

impl WorkerUsernameSearchForm {
    pub fn clean(&self) -> Result<Option<String>, FieldErrors> {
        let errors = rule_errors(self);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(normalize(&self.username))
    }
}
