use super::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A member of the workgroup. Workers are also the accounts that log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: i64,
    pub username: String,
    /// bcrypt hash. Never leaves the service.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position: Option<Position>,
}

impl Worker {
    pub fn position_id(&self) -> Option<i64> {
        self.position.as_ref().map(|p| p.id)
    }

    pub fn absolute_url(&self) -> String {
        format!("/workers/{}/", self.id)
    }
}

impl fmt::Display for Worker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.position {
            Some(position) => write!(f, "{} ({})", self.username, position),
            None => f.write_str(&self.username),
        }
    }
}

/// A validated worker ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewWorker {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position_id: Option<i64>,
}

/// The editable, non-credential part of a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerProfile {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position_id: Option<i64>,
}

/// What an update is allowed to touch. The caller picks the capability.
#[derive(Debug, Clone)]
pub enum WorkerUpdate {
    Profile(WorkerProfile),
    ProfileAndCredentials {
        profile: WorkerProfile,
        password_hash: String,
    },
}

impl WorkerUpdate {
    pub fn profile(&self) -> &WorkerProfile {
        match self {
            WorkerUpdate::Profile(profile) => profile,
            WorkerUpdate::ProfileAndCredentials { profile, .. } => profile,
        }
    }

    pub fn password_hash(&self) -> Option<&str> {
        match self {
            WorkerUpdate::Profile(_) => None,
            WorkerUpdate::ProfileAndCredentials { password_hash, .. } => Some(password_hash),
        }
    }
}
