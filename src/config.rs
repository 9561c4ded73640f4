use std::{net::SocketAddr, path::PathBuf};

use clap::{Parser, ValueEnum};
use time::Duration;

use crate::{
    auth::{Authorizer, NoopAuthorizer, SessionAuthorizer},
    session::{Sessions, MIN_KEY_LEN},
    store::Store,
};

/// Whether todos belong to registered users or to nobody in particular.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthMode {
    /// Register/login/logout routes, todos scoped to the session user.
    MultiUser,
    /// No sessions, one shared list, `/static` served from disk.
    SingleUser,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SESSION_KEY is required in multi-user mode")]
    MissingSessionKey,
    #[error("SESSION_KEY must be at least 32 bytes, got {0}")]
    ShortSessionKey(usize),
    #[error("DATABASE_MAX_CONNECTIONS must be at least 1")]
    NoConnections,
    #[error("SESSION_TTL_SECS must be at least 1")]
    NoSessionTtl,
}

/// Server settings, read from flags or the environment (`.env` is loaded first).
#[derive(Clone, Parser)]
#[command(name = "todo-web", version, about = "Multi-user to-do list web application")]
pub struct Config {
    /// Database connection string
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://todo.db")]
    pub database_url: String,

    /// Maximum pooled database connections
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 10)]
    pub max_connections: u32,

    /// Secret used to sign session cookies
    #[arg(long, env = "SESSION_KEY", hide_env_values = true)]
    pub session_key: Option<String>,

    /// Port to listen on
    /// Seconds a login session stays valid
    #[arg(long, env = "SESSION_TTL_SECS", default_value_t = 30 * 24 * 60 * 60)]
    pub session_ttl_secs: i64,

    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    #[arg(long, env = "AUTH_MODE", value_enum, default_value_t = AuthMode::MultiUser)]
    pub auth_mode: AuthMode,

    /// Directory served under /static in single-user mode
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url)
            .field("max_connections", &self.max_connections)
            .field("session_key", &self.session_key.as_ref().map(|_| "<redacted>"))
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("port", &self.port)
            .field("auth_mode", &self.auth_mode)
            .field("static_dir", &self.static_dir)
            .finish()
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::NoConnections);
        }
        if self.auth_mode == AuthMode::MultiUser {
            self.session_key()?;
            if self.session_ttl_secs <= 0 {
                return Err(ConfigError::NoSessionTtl);
            }
        }
        Ok(())
    }

    fn session_key(&self) -> Result<&[u8], ConfigError> {
        let key = self
            .session_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingSessionKey)?;
        if key.len() < MIN_KEY_LEN {
            return Err(ConfigError::ShortSessionKey(key.len()));
        }
        Ok(key.as_bytes())
    }

    pub fn authorizer(&self, store: Store) -> Result<Box<dyn Authorizer>, ConfigError> {
        let authorizer: Box<dyn Authorizer> = match self.auth_mode {
            AuthMode::MultiUser => Box::new(SessionAuthorizer::new(Sessions::new(
                self.session_key()?,
                store,
                Duration::seconds(self.session_ttl_secs),
            )?)),
            AuthMode::SingleUser => Box::new(NoopAuthorizer),
        };
        Ok(authorizer)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
