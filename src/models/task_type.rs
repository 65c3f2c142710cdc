use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Category of work ("Bug", "Feature", ...). Every task has exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TaskType {
    pub id: i64,
    pub name: String,
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.name)
    }
}
