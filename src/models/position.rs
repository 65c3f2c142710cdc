use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// An organizational position a worker can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Position {
    pub id: i64,
    pub name: String,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display() {
        let position = Position {
            id: 1,
            name: "Developer".into(),
        };
        assert_eq!(position.to_string(), "Developer");
    }
}
