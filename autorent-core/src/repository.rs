use async_trait::async_trait;
use crate::models::{Booking, Car, ImageOverrides, NewBooking};
use crate::CoreResult;

/// Repository trait for cars, bookings and image overrides
#[async_trait]
pub trait RentalRepository: Send + Sync {
    /// All cars, ascending id.
    async fn list_cars(&self) -> CoreResult<Vec<Car>>;

    async fn get_car(&self, id: i64) -> CoreResult<Option<Car>>;

    /// Sets the car's image and records it as an override.
    async fn set_car_image(&self, id: i64, image: &str) -> CoreResult<Option<Car>>;

    /// Drops the override and restores the seeded image.
    async fn reset_car_image(&self, id: i64) -> CoreResult<Option<Car>>;

    async fn reset_all_images(&self) -> CoreResult<()>;

    async fn images(&self) -> CoreResult<ImageOverrides>;

    /// All bookings, newest first.
    async fn list_bookings(&self) -> CoreResult<Vec<Booking>>;

    async fn bookings_for_car(&self, car_id: i64) -> CoreResult<Vec<Booking>> {
        let bookings = self.list_bookings().await?;
        Ok(bookings.into_iter().filter(|b| b.car_id == car_id).collect())
    }

    /// Appends a booking without any availability check.
    async fn create_booking(&self, booking: NewBooking) -> CoreResult<Booking>;
}
