//! Multi-user to-do list web application.
//!
//! Users register, log in, and manage their own todo list. The same handlers
//! also run in a single-user mode without sessions, selected by [`AuthMode`].

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod model;
pub mod password;
pub mod route;
pub mod schema;
pub mod session;
pub mod store;
pub mod view;

use auth::Authorizer;
pub use config::{AuthMode, Config};
use store::Store;
use view::Views;

// Struct representing the application state
pub struct AppState {
    pub store: Store,
    pub views: Views,
    pub authorizer: Box<dyn Authorizer>,
    pub mode: AuthMode,
}

impl AppState {
    pub fn new(
        store: Store,
        mode: AuthMode,
        authorizer: Box<dyn Authorizer>,
    ) -> Result<Self, tera::Error> {
        Ok(Self {
            store,
            views: Views::new(mode == AuthMode::MultiUser)?,
            authorizer,
            mode,
        })
    }
}
