use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_models::auth::{Session, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub city: Option<String>,
}

/// What the auth endpoints answer with.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: Option<User>,
    #[serde(alias = "token")]
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// The part of a session the UI may see. Tokens never leave the client core.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub user: User,
    pub issued_at: DateTime<Utc>,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            user: session.user.clone(),
            issued_at: session.issued_at,
        }
    }
}
