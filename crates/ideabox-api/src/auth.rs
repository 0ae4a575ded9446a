use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::error;

use ideabox_types::api::{
    AuthCheckResponse, ChangePasswordRequest, LoginRequest, SuccessResponse,
};

use crate::error::ApiError;
use crate::extract::Payload;
use crate::gateway::{Authorized, Gateway};

pub type AppState = Arc<Gateway>;

pub const SESSION_COOKIE: &str = "session_id";

/// Advertised session lifetime. Not enforced server-side.
pub const SESSION_MAX_AGE_DAYS: i64 = 30;

/// Run a blocking gateway call on the blocking pool.
pub(crate) async fn run_blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Gateway) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let gateway = state.clone();
    tokio::task::spawn_blocking(move || f(&gateway))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal("Internal server error")
        })?
}

pub(crate) fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::days(SESSION_MAX_AGE_DAYS))
        .build()
}

/// Expired, empty `session_id` cookie. Sent on every logout, whether or not
/// the request carried a session.
fn cleared_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .expires(time::OffsetDateTime::UNIX_EPOCH)
        .build()
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Payload(req): Payload<LoginRequest>,
) -> Result<(CookieJar, Json<SuccessResponse>), ApiError> {
    let token = run_blocking(&state, move |gw| gw.login(req.password.as_deref())).await?;

    Ok((jar.add(session_cookie(token)), Json(SuccessResponse::ok())))
}

/// POST /api/logout
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<SuccessResponse>) {
    state.logout(session_token(&jar).as_deref());

    (jar.add(cleared_session_cookie()), Json(SuccessResponse::ok()))
}

/// GET /api/auth/check
pub async fn check(State(state): State<AppState>, jar: CookieJar) -> Json<AuthCheckResponse> {
    Json(AuthCheckResponse {
        authenticated: state.check_auth(session_token(&jar).as_deref()),
    })
}

/// POST /api/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<Authorized>,
    Payload(req): Payload<ChangePasswordRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    run_blocking(&state, move |gw| {
        gw.change_password(&auth, req.new_password.as_deref())
    })
    .await?;

    Ok(Json(SuccessResponse::ok()))
}
