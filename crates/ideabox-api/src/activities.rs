use axum::{
    Extension, Json,
    extract::{Path, State},
};
use tracing::debug;

use ideabox_types::api::{AddActivityRequest, AddActivityResponse, SuccessResponse};
use ideabox_types::models::Activity;

use crate::auth::{AppState, run_blocking};
use crate::error::ApiError;
use crate::extract::Payload;
use crate::gateway::Authorized;

/// GET /api/activities, newest first.
pub async fn list_activities(
    State(state): State<AppState>,
    Extension(auth): Extension<Authorized>,
) -> Result<Json<Vec<Activity>>, ApiError> {
    let activities = run_blocking(&state, move |gw| gw.list_activities(&auth)).await?;
    Ok(Json(activities))
}

/// POST /api/activities
pub async fn add_activity(
    State(state): State<AppState>,
    Extension(auth): Extension<Authorized>,
    Payload(req): Payload<AddActivityRequest>,
) -> Result<Json<AddActivityResponse>, ApiError> {
    let activity =
        run_blocking(&state, move |gw| gw.add_activity(&auth, req.idea.as_deref())).await?;

    Ok(Json(AddActivityResponse {
        id: activity.id,
        idea: activity.idea,
    }))
}

/// GET /api/activities/random
pub async fn random_activity(
    State(state): State<AppState>,
    Extension(auth): Extension<Authorized>,
) -> Result<Json<Activity>, ApiError> {
    let activity = run_blocking(&state, move |gw| gw.random_activity(&auth)).await?;
    Ok(Json(activity))
}

/// DELETE /api/activities/{id}
///
/// An id that is not a number cannot match a row, so it is treated like any
/// other missing id.
pub async fn delete_activity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(auth): Extension<Authorized>,
) -> Result<Json<SuccessResponse>, ApiError> {
    match id.parse::<i64>() {
        Ok(id) => run_blocking(&state, move |gw| gw.delete_activity(&auth, id)).await?,
        Err(_) => debug!("Ignoring delete for non-numeric id '{}'", id),
    }
    Ok(Json(SuccessResponse::ok()))
}
