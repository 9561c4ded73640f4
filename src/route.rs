use std::{path::Path, sync::Arc};

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{handler::*, middleware::mw_require_auth, AppState, AuthMode};

pub fn create_router(app_state: Arc<AppState>, static_dir: &Path) -> Router {
    let todos = Router::new()
        .route("/", get(index))
        .route("/add-todo", post(add_todo))
        .route("/toggle-todo", post(toggle_todo))
        .route("/delete-todo", post(delete_todo))
        .route_layer(from_fn_with_state(app_state.clone(), mw_require_auth));

    let app = match app_state.mode {
        AuthMode::MultiUser => todos
            .route("/login", get(login_page).post(login))
            .route("/logout", get(logout))
            .route("/register", get(register_page).post(register)),
        AuthMode::SingleUser => todos.nest_service("/static", ServeDir::new(static_dir)),
    };

    app.with_state(app_state).layer(TraceLayer::new_for_http())
}
