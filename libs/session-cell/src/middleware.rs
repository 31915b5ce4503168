use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use shared_models::error::AppError;

use crate::services::SessionManager;

/// Gate for routes that act on behalf of the signed-in user.
///
/// The portal holds a single session, so there is no header to inspect:
/// the current session is attached to the request or the call is refused.
pub async fn require_session(
    State(sessions): State<Arc<SessionManager>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let session = sessions
        .current()
        .await
        .ok_or_else(|| AppError::Auth("Sign in to continue".to_string()))?;

    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}
