use thiserror::Error;

use shared_api_client::ApiError;
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Validation error: {0}")]
    Invalid(String),

    #[error("Auth response did not identify the user")]
    MissingUser,

    #[error("Not signed in")]
    NotSignedIn,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Invalid(msg) => AppError::ValidationError(msg),
            SessionError::MissingUser => AppError::ExternalService(err.to_string()),
            SessionError::NotSignedIn => AppError::Auth(err.to_string()),
            SessionError::Api(e) => e.into(),
        }
    }
}
