use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_api_client::error::to_app_error;
use shared_config::PortalConfig;
use shared_models::error::AppError;

use crate::models::{AvailabilityWindow, DaySchedule, Doctor, DoctorSearchQuery, SlotQuery};
use crate::services::{availability::AvailabilityService, doctor::DoctorService};

pub async fn search_doctors(
    State(state): State<Arc<PortalConfig>>,
    Query(query): Query<DoctorSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let doctors = doctor_service.search_doctors(&query, None).await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

pub async fn get_doctor(
    State(state): State<Arc<PortalConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Doctor>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let doctor = doctor_service.get_doctor(&doctor_id, None).await
        .map_err(to_app_error)?;

    Ok(Json(doctor))
}

pub async fn get_availability(
    State(state): State<Arc<PortalConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Vec<AvailabilityWindow>>, AppError> {
    let availability_service = AvailabilityService::new(&state);

    let windows = availability_service.get_availability_windows(&doctor_id, None).await
        .map_err(to_app_error)?;

    Ok(Json(windows))
}

pub async fn get_slots(
    State(state): State<Arc<PortalConfig>>,
    Path(doctor_id): Path<String>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<DaySchedule>, AppError> {
    let availability_service = AvailabilityService::new(&state);

    if query.date < availability_service.today() {
        return Err(AppError::ValidationError("Date must be today or later".to_string()));
    }

    debug!("Computing slots for doctor {} on {}", doctor_id, query.date);
    let schedule = availability_service.get_day_schedule(&doctor_id, query.date, None).await
        .map_err(to_app_error)?;

    Ok(Json(schedule))
}
