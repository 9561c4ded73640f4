use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Store-generated identifier of a user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct UserId(pub i64);

/// Store-generated identifier of a todo row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct TodoId(pub i64);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TodoId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TodoId)
    }
}

// Data model representing a Todo item
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub task: String,
    pub completed: bool,
    /// `None` for todos written in single-user mode.
    pub user_id: Option<UserId>,
}

// Registered account; `password` holds the PHC hash, never the plaintext
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password: String,
}

/// Whose todos a request may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// Single-user mode: every todo is visible.
    Unscoped,
    User(UserId),
}

impl Owner {
    /// Value bound to the `user_id` column filter; `None` disables the filter.
    pub(crate) fn user_id(self) -> Option<UserId> {
        match self {
            Owner::Unscoped => None,
            Owner::User(id) => Some(id),
        }
    }
}

/// Resolved by the authorization middleware and stored in request extensions.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub owner: Owner,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_id_parses_decimal_text() {
        assert_eq!("42".parse::<TodoId>().unwrap(), TodoId(42));
        assert_eq!(" 7 ".parse::<TodoId>().unwrap(), TodoId(7));
    }

    #[test]
    fn todo_id_rejects_garbage() {
        assert!("".parse::<TodoId>().is_err());
        assert!("65f0c0ffee".parse::<TodoId>().is_err());
        assert!("1; DROP TABLE todos".parse::<TodoId>().is_err());
    }

    #[test]
    fn unscoped_owner_has_no_filter() {
        assert_eq!(Owner::Unscoped.user_id(), None);
        assert_eq!(Owner::User(UserId(3)).user_id(), Some(UserId(3)));
    }
}
