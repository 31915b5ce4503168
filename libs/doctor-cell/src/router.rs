use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::PortalConfig;

use crate::handlers;

/// Doctor discovery and slot lookup. All of it is public; the backend
/// decides what an anonymous caller may see.
pub fn doctor_routes(state: Arc<PortalConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::search_doctors))
        .route("/{doctor_id}", get(handlers::get_doctor))
        .route("/{doctor_id}/availability", get(handlers::get_availability))
        .route("/{doctor_id}/slots", get(handlers::get_slots))
        .with_state(state)
}
