use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::AppError,
    routes::extract::{JsonBody, PatchBody},
    state::AppState,
    users::{NewUser, UpdateUser, User},
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/:username", get(get_user).patch(update_user))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state.users.create(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.find_by_username(&username).await?))
}

/// An empty body is an empty patch; the lookup still happens.
#[instrument(skip(state, patch))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    PatchBody(patch): PatchBody<UpdateUser>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.update(&username, patch).await?))
}
