use super::{finish, normalize, required, rule_errors};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct PositionForm {
    #[validate(length(max = 63, message = "Ensure this value has at most 63 characters."))]
    pub name: Option<String>,
}

impl PositionForm {
    pub fn clean(&self) -> Result<String, AppError> {
        clean_name(rule_errors(self), &self.name)
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct TaskTypeForm {
    #[validate(length(max = 255, message = "Ensure this value has at most 255 characters."))]
    pub name: Option<String>,
}

impl TaskTypeForm {
    pub fn clean(&self) -> Result<String, AppError> {
        clean_name(rule_errors(self), &self.name)
    }
}

fn clean_name(mut errors: crate::error::FieldErrors, raw: &Option<String>) -> Result<String, AppError> {
    let name = required(&mut errors, "name", normalize(raw));
    finish(errors, name)
}
