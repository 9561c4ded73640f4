//! Server-side sessions carried in a signed cookie.
//!
//! The cookie only holds a random session id, signed with a key derived from
//! `SESSION_KEY`. The id maps to a row in the `sessions` table with an expiry
//! that is checked on every request, so logout and expiry both take effect
//! server side regardless of what the browser keeps.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ring::rand::{SecureRandom, SystemRandom};
use time::{Duration, OffsetDateTime};

use crate::{config::ConfigError, error::AppError, model::UserId, store::Store};

pub const SESSION_COOKIE_NAME: &str = "session";

/// Signing keys shorter than this are rejected at startup.
pub const MIN_KEY_LEN: usize = 32;

pub const DEFAULT_SESSION_TTL: Duration = Duration::days(30);

/// What the session tells us about the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionData {
    pub user_id: Option<UserId>,
}

pub struct Sessions {
    key: Key,
    store: Store,
    ttl: Duration,
    rng: SystemRandom,
}

impl std::fmt::Debug for Sessions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sessions").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl Sessions {
    pub fn new(secret: &[u8], store: Store, ttl: Duration) -> Result<Self, ConfigError> {
        if secret.len() < MIN_KEY_LEN {
            return Err(ConfigError::ShortSessionKey(secret.len()));
        }

        Ok(Self {
            key: Key::derive_from(secret),
            store,
            ttl,
            rng: SystemRandom::new(),
        })
    }

    fn jar(&self, headers: &HeaderMap) -> SignedCookieJar {
        SignedCookieJar::from_headers(headers, self.key.clone())
    }

    /// Resolve the request's session. Missing, forged, expired and
    /// logged-out sessions all come back without a user.
    pub async fn load(&self, headers: &HeaderMap) -> Result<SessionData, AppError> {
        let Some(cookie) = self.jar(headers).get(SESSION_COOKIE_NAME) else {
            return Ok(SessionData::default());
        };

        let now = OffsetDateTime::now_utc().unix_timestamp();
        let user_id = self.store.find_session_user(cookie.value(), now).await?;
        if user_id.is_none() {
            tracing::debug!("session cookie names no live session");
        }

        Ok(SessionData { user_id })
    }

    /// Open a session for `user_id` and return the jar that sets its cookie.
    pub async fn start(
        &self,
        headers: &HeaderMap,
        user_id: UserId,
    ) -> Result<SignedCookieJar, AppError> {
        let now = OffsetDateTime::now_utc();

        let purged = self
            .store
            .delete_expired_sessions(now.unix_timestamp())
            .await?;
        if purged > 0 {
            tracing::debug!(purged, "removed expired sessions");
        }

        let id = self.new_session_id()?;
        self.store
            .insert_session(&id, user_id, (now + self.ttl).unix_timestamp())
            .await?;

        let cookie = Cookie::build(SESSION_COOKIE_NAME, id)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(self.ttl)
            .finish();

        Ok(self.jar(headers).add(cookie))
    }

    /// Forget the request's session and expire its cookie. Never fails; a
    /// store error is logged and the cookie is still removed.
    pub async fn end(&self, headers: &HeaderMap) -> SignedCookieJar {
        let jar = self.jar(headers);

        if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
            if let Err(e) = self.store.delete_session(cookie.value()).await {
                tracing::error!("failed to delete session: {}", e);
            }
        }

        jar.remove(removal_cookie())
    }

    fn new_session_id(&self) -> Result<String, AppError> {
        let mut bytes = [0u8; 32];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AppError::Session("system random number generator failed".to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }
}

fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::named(SESSION_COOKIE_NAME);
    cookie.set_path("/");
    cookie
}
