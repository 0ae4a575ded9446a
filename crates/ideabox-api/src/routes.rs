use std::path::Path;

use axum::{
    Router, middleware,
    routing::{delete, get, get_service, post},
};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::activities;
use crate::middleware::require_auth;

/// Full HTTP surface. Anything not under the API is served from
/// `static_dir`, with `index.html` as the fallback page.
///
/// API paths without a GET handler still answer GET with the fallback page,
/// so only the method routes listed here reach a handler.
pub fn router(state: AppState, static_dir: &Path) -> Router {
    let session = middleware::from_fn_with_state(state.clone(), require_auth);
    let index = get_service(ServeFile::new(static_dir.join("index.html")));

    let static_files =
        ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        // Public
        .route("/api/login", post(auth::login).merge(index.clone()))
        .route("/api/logout", post(auth::logout).merge(index.clone()))
        .route("/api/auth/check", get(auth::check))
        // Session required
        .route(
            "/api/activities",
            get(activities::list_activities)
                .post(activities::add_activity)
                .route_layer(session.clone()),
        )
        .route(
            "/api/activities/random",
            get(activities::random_activity).route_layer(session.clone()),
        )
        .route(
            "/api/activities/{id}",
            delete(activities::delete_activity)
                .route_layer(session.clone())
                .merge(index.clone()),
        )
        .route(
            "/api/auth/change-password",
            post(auth::change_password)
                .route_layer(session)
                .merge(index),
        )
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
