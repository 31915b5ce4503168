use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use shared_config::PortalConfig;
use shared_models::auth::Session;
use shared_models::error::AppError;

use crate::models::{Reservation, ReservationRequest};
use crate::services::ReservationService;

pub async fn create_reservation(
    State(state): State<Arc<PortalConfig>>,
    Extension(session): Extension<Session>,
    Json(request): Json<ReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), AppError> {
    let reservation_service = ReservationService::new(&state);

    let reservation = reservation_service.reserve(request, session.bearer()).await?;

    Ok((StatusCode::CREATED, Json(reservation)))
}

pub async fn list_reservations(
    State(state): State<Arc<PortalConfig>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    let reservation_service = ReservationService::new(&state);

    let reservations = reservation_service.list_my_reservations(session.bearer()).await?;

    Ok(Json(reservations))
}

pub async fn cancel_reservation(
    State(state): State<Arc<PortalConfig>>,
    Extension(session): Extension<Session>,
    Path(reservation_id): Path<String>,
) -> Result<Json<Reservation>, AppError> {
    let reservation_service = ReservationService::new(&state);

    let reservation = reservation_service.cancel(&reservation_id, session.bearer()).await?;

    Ok(Json(reservation))
}
