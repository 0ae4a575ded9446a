use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::{AppState, session_token};
use crate::error::ApiError;

/// Reject requests without a live `session_id` cookie. On success the
/// [`Authorized`](crate::gateway::Authorized) proof is stored in the request
/// extensions for handlers to pick up.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = state.require_auth(session_token(&jar).as_deref())?;

    req.extensions_mut().insert(auth);
    Ok(next.run(req).await)
}
