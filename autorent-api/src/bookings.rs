use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use autorent_core::{Booking, BookingRequest, RentalRepository};
use tracing::info;
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/bookings", get(list_bookings).post(create_booking))
}

/// POST /bookings
async fn create_booking(
    State(state): State<AppState>,
    body: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let Json(req) = body?;
    let booking = state.bookings.create_booking(req).await?;

    info!(
        "Booking confirmed: {} (car {}, {} to {})",
        booking.id, booking.car_id, booking.start_date, booking.end_date
    );
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /bookings
async fn list_bookings(State(state): State<AppState>) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.store.list_bookings().await?))
}
