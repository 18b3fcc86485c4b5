pub mod properties;
pub mod schemas;
pub mod users;

use crate::utilities::app_state::AppState;

use axum::{Json, Router, response::IntoResponse, routing::get};
use serde_json::json;

async fn health_handler() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .merge(properties::routes())
}
