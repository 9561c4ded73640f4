use serde::Deserialize;

use crate::{error::AppError, model::TodoId};

// Struct representing the form body for creating a new Todo
#[derive(Debug, Deserialize)]
pub struct AddTodoForm {
    #[serde(default)]
    pub task: String,
}

// Struct representing the form body for toggling or deleting a Todo
#[derive(Debug, Deserialize)]
pub struct TodoIdForm {
    #[serde(default)]
    pub id: String,
}

impl TodoIdForm {
    pub fn todo_id(&self) -> Result<TodoId, AppError> {
        self.id
            .parse()
            .map_err(|_| AppError::BadRequest(format!("invalid todo id {:?}", self.id)))
    }
}

// Shared by the login and register forms
#[derive(Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for CredentialsForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsForm")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
