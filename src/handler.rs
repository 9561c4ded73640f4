use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};

use crate::{
    error::{AppError, DUPLICATE_USERNAME, GENERIC_FAILURE, INVALID_CREDENTIALS},
    model::{CurrentUser, Owner, UserId},
    password::{hash_password_blocking, verify_dummy_blocking, verify_password_blocking},
    schema::{AddTodoForm, CredentialsForm, TodoIdForm},
    AppState,
};

const MISSING_CREDENTIALS: &str = "Username and password are required";

// Every todo handler finishes here, there is no separate success response
async fn render_index(state: &AppState, owner: Owner) -> Result<Html<String>, AppError> {
    let todos = state.store.list_todos(owner).await?;
    Ok(state.views.index(&todos)?)
}

// Handler for listing the current owner's todos
pub async fn index(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Html<String>, AppError> {
    render_index(&state, user.owner).await
}

// Handler for creating a new Todo; an empty task is ignored
pub async fn add_todo(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Form(body): Form<AddTodoForm>,
) -> Result<Html<String>, AppError> {
    if !body.task.is_empty() {
        let todo = state.store.insert_todo(user.owner, &body.task).await?;
        tracing::debug!(todo.id = %todo.id, "todo added");
    }

    render_index(&state, user.owner).await
}

// Handler for flipping the completed flag of a Todo
pub async fn toggle_todo(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Form(body): Form<TodoIdForm>,
) -> Result<Html<String>, AppError> {
    let id = body.todo_id()?;

    let todo = state
        .store
        .toggle_todo(user.owner, id)
        .await?
        .ok_or(AppError::TodoNotFound(id))?;
    tracing::debug!(todo.id = %todo.id, completed = todo.completed, "todo toggled");

    render_index(&state, user.owner).await
}

// Handler for deleting a Todo; deleting a missing id still re-renders
pub async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Form(body): Form<TodoIdForm>,
) -> Result<Html<String>, AppError> {
    let id = body.todo_id()?;

    let removed = state.store.delete_todo(user.owner, id).await?;
    tracing::debug!(todo.id = %id, removed, "todo deleted");

    render_index(&state, user.owner).await
}

pub async fn login_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    Ok(state.views.login(None)?)
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(body): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let user_id = match authenticate(&state, &body).await {
        Ok(user_id) => user_id,
        Err(e @ AppError::InvalidCredentials) => {
            let page = state.views.login(Some(INVALID_CREDENTIALS))?;
            return Ok((e.status(), page).into_response());
        }
        Err(e) => return Err(e),
    };

    let sessions = state.authorizer.sessions().ok_or_else(|| {
        AppError::BadRequest("login is unavailable without sessions".to_string())
    })?;
    let jar = sessions.start(&headers, user_id).await?;

    tracing::info!(username = %body.username, "user logged in");
    Ok((jar, Redirect::to("/")).into_response())
}

// Unknown user and wrong password deliberately end in the same error
async fn authenticate(state: &AppState, form: &CredentialsForm) -> Result<UserId, AppError> {
    let Some(user) = state.store.find_user_by_username(&form.username).await? else {
        verify_dummy_blocking(form.password.clone()).await?;
        tracing::info!(username = %form.username, "login for unknown user");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password_blocking(form.password.clone(), user.password).await? {
        tracing::info!(username = %form.username, "login with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    Ok(user.id)
}

pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    match state.authorizer.sessions() {
        Some(sessions) => (sessions.end(&headers).await, Redirect::to("/login")).into_response(),
        None => Redirect::to("/login").into_response(),
    }
}

pub async fn register_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    Ok(state.views.register(None)?)
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Form(body): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let err = match create_user(&state, &body).await {
        Ok(user_id) => {
            tracing::info!(username = %body.username, user.id = user_id.0, "user registered");
            return Ok(Redirect::to("/login").into_response());
        }
        Err(e) => e,
    };

    let message = match &err {
        AppError::DuplicateUsername => DUPLICATE_USERNAME,
        AppError::BadRequest(_) => MISSING_CREDENTIALS,
        e => {
            tracing::error!("registration failed: {}", e);
            GENERIC_FAILURE
        }
    };

    let page = state.views.register(Some(message))?;
    Ok((err.status(), page).into_response())
}

async fn create_user(state: &AppState, form: &CredentialsForm) -> Result<UserId, AppError> {
    if form.username.is_empty() || form.password.is_empty() {
        return Err(AppError::BadRequest("empty username or password".to_string()));
    }

    // The UNIQUE constraint on users.username backs this check up
    if state
        .store
        .find_user_by_username(&form.username)
        .await?
        .is_some()
    {
        return Err(AppError::DuplicateUsername);
    }

    let hash = hash_password_blocking(form.password.clone()).await?;
    state.store.insert_user(&form.username, &hash).await
}
