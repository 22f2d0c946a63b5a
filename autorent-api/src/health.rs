use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use autorent_core::RentalRepository;
use serde_json::{json, Value};
use crate::error::AppError;
use crate::middleware::RequestRecord;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/debug/db", get(db_snapshot))
        .route("/debug/db/backup", post(db_backup))
        .route("/debug/requests", get(recent_requests))
        .route("/debug/errors", get(recent_errors))
}

/// GET /health
async fn health(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let cars = state.store.list_cars().await?.len();
    let bookings = state.store.list_bookings().await?.len();
    let images = state.store.images().await?.len();
    let persistent = state.store.is_persistent().await;

    Ok(Json(json!({
        "ok": true,
        "cars": cars,
        "bookings": bookings,
        "images": images,
        "persistent": persistent,
    })))
}

/// GET /debug/db
async fn db_snapshot(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.store.snapshot().await;
    Json(json!({ "ok": true, "snapshot": snapshot }))
}

/// POST /debug/db/backup
async fn db_backup(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let path = state.store.backup().await?;
    Ok(Json(json!({ "ok": true, "path": path })))
}

/// GET /debug/requests
async fn recent_requests(State(state): State<AppState>) -> Json<Vec<RequestRecord>> {
    Json(state.debug.recent_requests().await)
}

/// GET /debug/errors
async fn recent_errors(State(state): State<AppState>) -> Json<Vec<RequestRecord>> {
    Json(state.debug.recent_errors().await)
}
