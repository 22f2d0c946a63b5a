pub mod booking;
pub mod image;
pub mod models;
pub mod repository;

pub use booking::{BookingEngine, BookingRequest};
pub use image::{resolve, AssetLookup, FsAssets, PLACEHOLDER_IMAGE};
pub use models::{Booking, Car, Customer, ImageOverrides, NewBooking};
pub use repository::RentalRepository;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFoundError(String),
    #[error("Car not available for these dates (conflicts with booking {booking_id})")]
    ConflictError { booking_id: i64 },
}

pub type CoreResult<T> = Result<T, CoreError>;
