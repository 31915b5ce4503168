use std::sync::Arc;

use axum::{
    routing::post,
    Router,
};

use shared_config::PortalConfig;

use crate::handlers;

/// Expects a `Session` extension, so mount it behind the session middleware.
pub fn reservation_routes(state: Arc<PortalConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::create_reservation).get(handlers::list_reservations))
        .route("/{reservation_id}/cancel", post(handlers::cancel_reservation))
        .with_state(state)
}
