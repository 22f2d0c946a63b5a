use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use autorent_core::{ImageOverrides, RentalRepository};
use serde_json::{json, Value};
use tracing::info;
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/images", get(list_overrides))
        .route("/images/reset", post(reset_all))
}

/// GET /images
async fn list_overrides(State(state): State<AppState>) -> Result<Json<ImageOverrides>, AppError> {
    Ok(Json(state.store.images().await?))
}

/// POST /images/reset
async fn reset_all(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.store.reset_all_images().await?;
    info!("All image overrides cleared");
    Ok(Json(json!({ "message": "Images reset" })))
}
