use axum::{routing::get, Router};

use crate::state::AppState;

pub mod extract;
pub mod migrations;
pub mod users;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(users::user_routes())
        .merge(migrations::migration_routes())
        .route("/health", get(|| async { "ok" }))
}
