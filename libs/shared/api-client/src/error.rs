use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = extract_message(body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

        match status.as_u16() {
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            400 | 422 => ApiError::Validation(message),
            code => ApiError::Status { status: code, message },
        }
    }

    /// Auth failures mean the stored token is no longer any good.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_) | ApiError::Forbidden(_))
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ApiError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized(msg) | ApiError::Forbidden(msg) => AppError::Auth(msg),
            ApiError::NotFound(msg) => AppError::NotFound(msg),
            ApiError::Conflict(msg) => AppError::Conflict(msg),
            ApiError::Validation(msg) => AppError::ValidationError(msg),
            ApiError::InvalidRequest(msg) => AppError::BadRequest(msg),
            other => AppError::ExternalService(other.to_string()),
        }
    }
}

/// Maps a service failure onto the gateway's error type, keeping the
/// backend's classification when one is buried in the chain.
pub fn to_app_error(err: anyhow::Error) -> AppError {
    match err.downcast::<ApiError>() {
        Ok(api_error) => api_error.into(),
        Err(other) => AppError::Internal(format!("{:#}", other)),
    }
}

/// Pulls a human readable message out of a backend error body.
fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Ok(json) = serde_json::from_str::<Value>(trimmed) else {
        return Some(trimmed.to_string());
    };

    json.get("message")
        .and_then(Value::as_str)
        .or_else(|| json.get("error").and_then(Value::as_str))
        .or_else(|| json.pointer("/error/message").and_then(Value::as_str))
        .map(str::to_string)
        .or_else(|| Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_conflict_keeps_backend_message() {
        let err = ApiError::from_status(
            StatusCode::CONFLICT,
            r#"{"message":"This time slot has just been booked"}"#,
        );
        assert_matches!(err, ApiError::Conflict(msg) if msg == "This time slot has just been booked");
    }

    #[test]
    fn test_nested_error_message() {
        let err = ApiError::from_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"error":{"message":"date is required","code":"invalid"}}"#,
        );
        assert_matches!(err, ApiError::Validation(msg) if msg == "date is required");
    }

    #[test]
    fn test_plain_text_and_empty_bodies() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream down");
        assert_matches!(err, ApiError::Status { status: 502, ref message } if message == "upstream down");
        assert!(err.is_retryable());

        let err = ApiError::from_status(StatusCode::NOT_FOUND, "");
        assert_matches!(err, ApiError::NotFound(msg) if msg == "Not Found");
    }

    #[test]
    fn test_to_app_error_sees_through_context() {
        let err = anyhow::Error::new(ApiError::NotFound("Doctor not found".to_string()))
            .context("fetching doctor 42");

        assert_matches!(to_app_error(err), AppError::NotFound(msg) if msg == "Doctor not found");
        assert_matches!(to_app_error(anyhow::anyhow!("disk full")), AppError::Internal(_));
    }

    #[test]
    fn test_auth_failures() {
        assert!(ApiError::from_status(StatusCode::UNAUTHORIZED, "").is_auth_failure());
        assert!(ApiError::from_status(StatusCode::FORBIDDEN, "").is_auth_failure());
        assert!(!ApiError::from_status(StatusCode::CONFLICT, "").is_auth_failure());
    }
}
