use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::models::{Booking, Customer, NewBooking};
use crate::repository::RentalRepository;
use crate::{CoreError, CoreResult};

/// Car id as sent by clients: a JSON integer or a numeric string. `None`
/// for zero and for anything else (fractions, booleans, words).
fn car_id_from(value: &Value) -> Option<i64> {
    let id = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (id != 0).then_some(id)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerRequest {
    pub name: Option<String>,
}

/// Booking request body. Every field is optional on the wire so missing
/// fields surface as validation errors instead of decode failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub car_id: Option<Value>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub customer: Option<CustomerRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ValidatedBooking {
    car_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    customer_name: String,
}

impl BookingRequest {
    fn validate(&self) -> CoreResult<ValidatedBooking> {
        let missing = || CoreError::ValidationError("Missing required fields".to_string());

        let car_ref = self.car_id.as_ref().ok_or_else(missing)?;
        let start_raw = non_blank(self.start_date.as_deref()).ok_or_else(missing)?;
        let end_raw = non_blank(self.end_date.as_deref()).ok_or_else(missing)?;
        let customer_name = self
            .customer
            .as_ref()
            .and_then(|c| non_blank(c.name.as_deref()))
            .ok_or_else(missing)?;

        let car_id = car_id_from(car_ref)
            .ok_or_else(|| CoreError::ValidationError("Invalid car id".to_string()))?;

        let invalid_dates = || CoreError::ValidationError("Invalid dates".to_string());
        let start = parse_booking_date(start_raw).ok_or_else(invalid_dates)?;
        let end = parse_booking_date(end_raw).ok_or_else(invalid_dates)?;
        if start > end {
            return Err(invalid_dates());
        }

        Ok(ValidatedBooking {
            car_id,
            start,
            end,
            customer_name: customer_name.to_string(),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` (read as UTC)
/// and plain calendar dates (midnight UTC).
pub fn parse_booking_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Validates booking requests and admits them only when the car is free for
/// the whole closed date range.
pub struct BookingEngine {
    repo: Arc<dyn RentalRepository>,
    // Held across read -> check -> append -> persist.
    gate: Mutex<()>,
}

impl BookingEngine {
    pub fn new(repo: Arc<dyn RentalRepository>) -> Self {
        Self {
            repo,
            gate: Mutex::new(()),
        }
    }

    pub async fn create_booking(&self, request: BookingRequest) -> CoreResult<Booking> {
        let valid = request.validate()?;

        let car = self
            .repo
            .get_car(valid.car_id)
            .await?
            .ok_or_else(|| CoreError::NotFoundError("Car not found".to_string()))?;

        let _gate = self.gate.lock().await;

        let existing = self.repo.bookings_for_car(car.id).await?;
        if let Some(conflict) = existing.iter().find(|b| b.overlaps(valid.start, valid.end)) {
            warn!(
                "Booking rejected for car {}: overlaps booking {}",
                car.id, conflict.id
            );
            return Err(CoreError::ConflictError {
                booking_id: conflict.id,
            });
        }

        let booking = self
            .repo
            .create_booking(NewBooking {
                car_id: car.id,
                start_date: valid.start,
                end_date: valid.end,
                customer: Customer {
                    name: valid.customer_name,
                },
            })
            .await?;

        info!(
            "Booking {} created for car {} ({} {})",
            booking.id, car.id, car.make, car.model
        );
        Ok(booking)
    }
}
