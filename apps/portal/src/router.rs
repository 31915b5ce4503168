use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use doctor_cell::router::doctor_routes;
use notification_cell::notification_routes;
use reservation_cell::router::reservation_routes;
use session_cell::{require_session, session_routes};

use crate::context::AppContext;
use crate::preferences;

pub fn create_router(ctx: Arc<AppContext>) -> Router {
    let preferences = Router::new()
        .route(
            "/preferences",
            get(preferences::get_preferences).put(preferences::update_preferences),
        )
        .with_state(ctx.clone());

    // Handlers below read the `Session` that `require_session` attaches
    let protected = Router::new()
        .nest("/reservations", reservation_routes(ctx.config.clone()))
        .nest("/notifications", notification_routes(ctx.notifications.clone()))
        .merge(preferences)
        .layer(middleware::from_fn_with_state(ctx.sessions.clone(), require_session));

    Router::new()
        .route("/", get(|| async { "MediBook portal is running!" }))
        .nest("/doctors", doctor_routes(ctx.config.clone()))
        .nest("/session", session_routes(ctx.sessions.clone()))
        .merge(protected)
}
