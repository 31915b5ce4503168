use thiserror::Error;

use doctor_cell::TimeSlot;
use shared_api_client::ApiError;
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum ReservationError {
    #[error("The {0} slot is not available on this date")]
    SlotUnavailable(TimeSlot),

    /// Someone else got there first; carries the backend's wording.
    #[error("{0}")]
    SlotTaken(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Reservation not found")]
    NotFound,

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Could not check availability: {0}")]
    Availability(anyhow::Error),

    #[error("Backend error: {0}")]
    Backend(ApiError),
}

impl From<ApiError> for ReservationError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Conflict(msg) => ReservationError::SlotTaken(msg),
            ApiError::Validation(msg) => ReservationError::ValidationError(msg),
            ApiError::NotFound(_) => ReservationError::NotFound,
            ApiError::Unauthorized(msg) | ApiError::Forbidden(msg) => ReservationError::Unauthorized(msg),
            other => ReservationError::Backend(other),
        }
    }
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::SlotUnavailable(_) => AppError::Conflict(err.to_string()),
            ReservationError::SlotTaken(msg) => AppError::Conflict(msg),
            ReservationError::ValidationError(msg) => AppError::ValidationError(msg),
            ReservationError::NotFound => AppError::NotFound(err.to_string()),
            ReservationError::Unauthorized(msg) => AppError::Auth(msg),
            ReservationError::Availability(e) => shared_api_client::error::to_app_error(e),
            ReservationError::Backend(e) => e.into(),
        }
    }
}
