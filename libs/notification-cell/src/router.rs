use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::services::NotificationCenter;

/// Expects a `Session` extension; mount behind the session gate.
pub fn notification_routes(center: Arc<NotificationCenter>) -> Router {
    Router::new()
        .route("/", get(handlers::list_notifications))
        .route("/{notification_id}/read", post(handlers::mark_read))
        .with_state(center)
}
