use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::instrument;

use crate::{error::AppError, migrations::MigrationInfo, state::AppState};

pub fn migration_routes() -> Router<AppState> {
    Router::new().route("/migrations", get(list_pending).post(run_pending))
}

#[instrument(skip(state))]
pub async fn list_pending(
    State(state): State<AppState>,
) -> Result<Json<Vec<MigrationInfo>>, AppError> {
    Ok(Json(state.migrations.list_pending().await?))
}

/// 201 when something was applied, 200 when the schema was already current.
#[instrument(skip(state))]
pub async fn run_pending(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<MigrationInfo>>), AppError> {
    let ran = state.migrations.run_pending().await?;
    let status = if ran.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(ran)))
}
