//! Resolving the acting owner of a request.

use async_trait::async_trait;
use axum::http::HeaderMap;

use crate::{error::AppError, model::Owner, session::Sessions};

/// Decides whose todos a request may touch.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// # Errors
    ///
    /// [`AppError::NotAuthenticated`] when the request carries no live session.
    async fn authorize(&self, headers: &HeaderMap) -> Result<Owner, AppError>;

    /// Sessions opened at login and closed at logout; `None` when sessions are off.
    fn sessions(&self) -> Option<&Sessions> {
        None
    }
}

/// Single-user mode: everyone may see everything.
#[derive(Debug, Default)]
pub struct NoopAuthorizer;

#[async_trait]
impl Authorizer for NoopAuthorizer {
    async fn authorize(&self, _headers: &HeaderMap) -> Result<Owner, AppError> {
        Ok(Owner::Unscoped)
    }
}

/// Multi-user mode: the owner comes from the session named by the signed cookie.
#[derive(Debug)]
pub struct SessionAuthorizer {
    sessions: Sessions,
}

impl SessionAuthorizer {
    pub fn new(sessions: Sessions) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl Authorizer for SessionAuthorizer {
    async fn authorize(&self, headers: &HeaderMap) -> Result<Owner, AppError> {
        let session = self.sessions.load(headers).await?;

        session.user_id.map(Owner::User).ok_or_else(|| {
            tracing::debug!("no live session, redirecting to login");
            AppError::NotAuthenticated
        })
    }

    fn sessions(&self) -> Option<&Sessions> {
        Some(&self.sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{session::DEFAULT_SESSION_TTL, store::Store};
    use axum::{
        http::header::{COOKIE, SET_COOKIE},
        response::IntoResponse,
    };

    const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

    async fn session_authorizer() -> (SessionAuthorizer, Store) {
        let store = Store::connect("sqlite::memory:", 1).await.unwrap();
        let sessions = Sessions::new(KEY, store.clone(), DEFAULT_SESSION_TTL).unwrap();
        (SessionAuthorizer::new(sessions), store)
    }

    fn cookie_headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, value.parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn noop_authorizer_is_unscoped() {
        assert_eq!(
            NoopAuthorizer.authorize(&HeaderMap::new()).await.unwrap(),
            Owner::Unscoped
        );
        assert!(NoopAuthorizer.sessions().is_none());
    }

    #[tokio::test]
    async fn live_session_yields_its_user() {
        let (auth, store) = session_authorizer().await;
        let alice = store.insert_user("alice", "hash").await.unwrap();

        let jar = auth
            .sessions()
            .unwrap()
            .start(&HeaderMap::new(), alice)
            .await
            .unwrap();
        let response = jar.into_response();
        let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        let headers = cookie_headers(set_cookie.split(';').next().unwrap());

        assert_eq!(auth.authorize(&headers).await.unwrap(), Owner::User(alice));
    }

    #[tokio::test]
    async fn missing_or_forged_session_is_not_authenticated() {
        let (auth, _store) = session_authorizer().await;

        for headers in [HeaderMap::new(), cookie_headers("session=forged.value")] {
            assert!(matches!(
                auth.authorize(&headers).await,
                Err(AppError::NotAuthenticated)
            ));
        }
    }
}
