use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};
use lazy_static::lazy_static;

lazy_static! {
    // Same cost as real hashes, so an unknown username costs one full verify.
    static ref UNKNOWN_USER_HASH: Option<String> = hash("unknown-user", DEFAULT_COST).ok();
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}

/// Runs a bcrypt verification for a username that does not exist and
/// reports a mismatch. Keeps a failed login equally slow either way.
pub fn reject_unknown_user(password: &str) -> bool {
    if let Some(placeholder) = UNKNOWN_USER_HASH.as_deref() {
        if let Err(e) = verify(password, placeholder) {
            log::warn!("placeholder verification failed: {}", e);
        }
    }
    false
}
