use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use autorent_core::image::{is_external, resolve};
use autorent_core::{Car, RentalRepository};
use serde_json::Value;
use tracing::info;
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cars", get(list_cars))
        .route("/cars/{id}", get(get_car).put(update_car))
        .route("/cars/{id}/reset", post(reset_car))
}

pub(crate) fn parse_car_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::ValidationError("Invalid car id".to_string()))
}

fn car_not_found() -> AppError {
    AppError::NotFoundError("Car not found".to_string())
}

/// GET /cars
async fn list_cars(State(state): State<AppState>) -> Result<Json<Vec<Car>>, AppError> {
    let cars = state.store.list_cars().await?;
    info!("GET /cars -> {} rows", cars.len());
    Ok(Json(cars))
}

/// GET /cars/:id
async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Car>, AppError> {
    let id = parse_car_id(&id)?;
    let car = state.store.get_car(id).await?.ok_or_else(car_not_found)?;
    Ok(Json(car))
}

/// PUT /cars/:id
///
/// Remote URLs and data URIs are stored verbatim; local paths go through the
/// image resolver first.
async fn update_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Car>, AppError> {
    let id = parse_car_id(&id)?;
    state.store.get_car(id).await?.ok_or_else(car_not_found)?;

    let Json(body) = body?;
    let image = match body.get("image") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => return Err(AppError::ValidationError("Image must be a string".to_string())),
    }
    .ok_or_else(|| AppError::ValidationError("Missing image in body".to_string()))?;

    let stored = if is_external(image) {
        image.to_string()
    } else {
        resolve(image, state.assets.as_ref())
    };

    let updated = state
        .store
        .set_car_image(id, &stored)
        .await?
        .ok_or_else(car_not_found)?;

    info!("Updated car {} image to {}", id, updated.image);
    Ok(Json(updated))
}

/// POST /cars/:id/reset
async fn reset_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Car>, AppError> {
    let id = parse_car_id(&id)?;
    let car = state
        .store
        .reset_car_image(id)
        .await?
        .ok_or_else(car_not_found)?;

    info!("Reset car {} image to {}", id, car.image);
    Ok(Json(car))
}
