use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::services::SessionManager;

pub fn session_routes(sessions: Arc<SessionManager>) -> Router {
    Router::new()
        .route("/", get(handlers::current_session))
        .route("/login", post(handlers::login))
        .route("/register", post(handlers::register))
        .route("/logout", post(handlers::logout))
        .route("/refresh", post(handlers::refresh))
        .with_state(sessions)
}
