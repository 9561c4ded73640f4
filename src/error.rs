use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use crate::model::TodoId;

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";
pub const DUPLICATE_USERNAME: &str = "Username already exists";
pub const GENERIC_FAILURE: &str = "An error occurred. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("username already exists")]
    DuplicateUsername,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("todo {0} not found for current owner")]
    TodoNotFound(TodoId),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("password hash error: {0}")]
    Password(String),

    #[error("session error: {0}")]
    Session(String),

    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AppError {
    /// Status sent for this error, whether as a bare response or with a
    /// re-rendered form.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotAuthenticated => StatusCode::SEE_OTHER,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::DuplicateUsername => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::TodoNotFound(_)
            | AppError::Database(_)
            | AppError::Template(_)
            | AppError::Password(_)
            | AppError::Session(_)
            | AppError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Failures that are the server's fault; the detail is logged, never sent.
    pub fn is_internal(&self) -> bool {
        self.status().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::NotAuthenticated = self {
            return Redirect::to("/login").into_response();
        }

        let status = self.status();
        if self.is_internal() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("rejecting request: {}", self);
        }

        let reason = status.canonical_reason().unwrap_or("Error");
        (status, reason).into_response()
    }
}
