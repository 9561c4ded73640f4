use std::sync::Arc;

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, model::CurrentUser, AppState};

/// Gate in front of every todo route.
///
/// Resolves the acting owner through the configured authorizer and stores it
/// as [`CurrentUser`] in the request extensions. Requests without a live
/// session are redirected to `/login` by [`AppError::NotAuthenticated`].
pub async fn mw_require_auth<B>(
    State(state): State<Arc<AppState>>,
    mut request: Request<B>,
    next: Next<B>,
) -> Result<Response, AppError> {
    let owner = state.authorizer.authorize(request.headers()).await?;

    request.extensions_mut().insert(CurrentUser { owner });

    Ok(next.run(request).await)
}
