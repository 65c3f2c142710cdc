use super::{finish, normalize, reject, required, rule_errors, IdInput, INVALID_CHOICE};
use crate::error::{AppError, FieldErrors};
use crate::models::WorkerProfile;
use crate::store::{Store, DUPLICATE_USERNAME};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const MIN_PASSWORD_LENGTH: usize = 8;

lazy_static! {
    // Letters, digits and @/./+/-/_
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[\w.@+-]+$").unwrap();
}

/// Profile fields of a worker. Used on its own for the profile update and
/// embedded in the creation form.
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct WorkerProfileForm {
    #[validate(
        length(max = 150, message = "Ensure this value has at most 150 characters."),
        regex(
            path = "USERNAME_REGEX",
            message = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
        )
    )]
    pub username: Option<String>,
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub last_name: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    pub position: Option<IdInput>,
}

impl WorkerProfileForm {
    /// Blank text inputs become absent so the optional fields validate.
    fn normalized(&self) -> Self {
        Self {
            username: normalize(&self.username),
            first_name: normalize(&self.first_name),
            last_name: normalize(&self.last_name),
            email: normalize(&self.email),
            position: self.position.clone().filter(|raw| !raw.is_blank()),
        }
    }

    /// `current_id` is the worker being edited, so keeping one's own
    /// username is not a conflict.
    async fn collect(
        &self,
        store: &dyn Store,
        current_id: Option<i64>,
        errors: &mut FieldErrors,
    ) -> Result<Option<WorkerProfile>, AppError> {
        let form = self.normalized();
        errors.extend(rule_errors(&form));

        let username = required(errors, "username", form.username.clone());
        if let Some(username) = &username {
            if let Some(existing) = store.find_worker_by_username(username).await? {
                if Some(existing.id) != current_id {
                    reject(errors, "username", DUPLICATE_USERNAME);
                }
            }
        }

        let position_id = match &form.position {
            None => Some(None),
            Some(raw) => {
                let found = match raw.parse() {
                    Some(id) => store.get_position(id).await?.map(|position| position.id),
                    None => None,
                };
                if found.is_none() {
                    reject(errors, "position", INVALID_CHOICE);
                }
                found.map(Some)
            }
        };

        Ok(match (username, position_id) {
            (Some(username), Some(position_id)) => Some(WorkerProfile {
                username,
                first_name: form.first_name.unwrap_or_default(),
                last_name: form.last_name.unwrap_or_default(),
                email: form.email.unwrap_or_default(),
                position_id,
            }),
            _ => None,
        })
    }

    pub async fn clean(
        &self,
        store: &dyn Store,
        current_id: Option<i64>,
    ) -> Result<WorkerProfile, AppError> {
        let mut errors = FieldErrors::new();
        let profile = self.collect(store, current_id, &mut errors).await?;
        finish(errors, profile)
    }
}

/// Profile fields plus a password entered twice. Used to create a worker and
/// for the "profile and credentials" update.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct WorkerCreationForm {
    #[serde(flatten)]
    pub profile: WorkerProfileForm,
    pub password1: Option<String>,
    pub password2: Option<String>,
}

/// Profile plus the plain password; the caller hashes it.
#[derive(Debug, Clone)]
pub struct CleanedCredentials {
    pub profile: WorkerProfile,
    pub password: String,
}

impl WorkerCreationForm {
    pub async fn clean(
        &self,
        store: &dyn Store,
        current_id: Option<i64>,
    ) -> Result<CleanedCredentials, AppError> {
        let mut errors = FieldErrors::new();
        let profile = self.profile.collect(store, current_id, &mut errors).await?;
        let password = clean_passwords(&self.password1, &self.password2, &mut errors);

        let cleaned = match (profile, password) {
            (Some(profile), Some(password)) => Some(CleanedCredentials { profile, password }),
            _ => None,
        };
        finish(errors, cleaned)
    }
}

/// Passwords are not trimmed: whitespace is part of the secret.
fn clean_passwords(
    password1: &Option<String>,
    password2: &Option<String>,
    errors: &mut FieldErrors,
) -> Option<String> {
    let password1 = required(errors, "password1", password1.clone().filter(|p| !p.is_empty()));
    let password2 = required(errors, "password2", password2.clone().filter(|p| !p.is_empty()));
    let (password1, password2) = (password1?, password2?);

    if password1 != password2 {
        reject(errors, "password2", "The two password fields didn’t match.");
        return None;
    }
    if password2.chars().count() < MIN_PASSWORD_LENGTH {
        reject(
            errors,
            "password2",
            format!(
                "This password is too short. It must contain at least {} characters.",
                MIN_PASSWORD_LENGTH
            ),
        );
        return None;
    }
    if password2.chars().all(|c| c.is_ascii_digit()) {
        reject(errors, "password2", "This password is entirely numeric.");
        return None;
    }
    Some(password2)
}
