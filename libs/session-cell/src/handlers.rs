use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::debug;

use shared_models::error::AppError;

use crate::error::SessionError;
use crate::models::{LoginRequest, RegisterRequest, SessionView};
use crate::services::{RefreshOutcome, SessionManager};

pub async fn login(
    State(sessions): State<Arc<SessionManager>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = sessions.login(request).await?;
    Ok(Json(SessionView::from(&session)))
}

pub async fn register(
    State(sessions): State<Arc<SessionManager>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let session = sessions.register(request).await?;
    Ok((StatusCode::CREATED, Json(SessionView::from(&session))))
}

pub async fn logout(
    State(sessions): State<Arc<SessionManager>>,
) -> StatusCode {
    sessions.logout().await;
    StatusCode::NO_CONTENT
}

pub async fn current_session(
    State(sessions): State<Arc<SessionManager>>,
) -> Result<Json<SessionView>, AppError> {
    let session = sessions.current().await.ok_or(SessionError::NotSignedIn)?;
    Ok(Json(SessionView::from(&session)))
}

pub async fn refresh(
    State(sessions): State<Arc<SessionManager>>,
) -> Result<Json<Value>, AppError> {
    debug!("Manual token refresh requested");

    match sessions.refresh().await? {
        RefreshOutcome::Refreshed => Ok(Json(json!({ "refreshed": true }))),
        RefreshOutcome::NoSession | RefreshOutcome::Expired => Err(SessionError::NotSignedIn.into()),
    }
}
