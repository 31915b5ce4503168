use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use shared_api_client::error::to_app_error;
use shared_models::auth::Session;
use shared_models::error::AppError;

use crate::models::NotificationFeed;
use crate::services::NotificationCenter;

/// Refreshes the list on demand so the UI does not wait for the next poll.
pub async fn list_notifications(
    State(center): State<Arc<NotificationCenter>>,
    Extension(session): Extension<Session>,
) -> Result<Json<NotificationFeed>, AppError> {
    center.poll_once(session.bearer()).await.map_err(to_app_error)?;

    Ok(Json(NotificationFeed {
        notifications: center.latest().await,
        unread: center.unread_count().await,
    }))
}

pub async fn mark_read(
    State(center): State<Arc<NotificationCenter>>,
    Extension(session): Extension<Session>,
    Path(notification_id): Path<String>,
) -> Result<StatusCode, AppError> {
    center.mark_read(&notification_id, session.bearer()).await
        .map_err(to_app_error)?;

    Ok(StatusCode::NO_CONTENT)
}
