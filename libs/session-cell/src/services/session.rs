use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use shared_api_client::ApiClient;
use shared_config::PortalConfig;
use shared_models::auth::{Session, TokenSource, User};
use shared_utils::jwt::{decode_claims, is_expired, user_from_claims};
use shared_utils::{ScheduledTask, StateFile};

use crate::error::SessionError;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};

const SESSION_FILE: &str = "session.json";

/// Tokens this close to `exp` are treated as already expired.
const EXPIRY_LEEWAY_SECS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed,
    NoSession,
    /// The backend refused the refresh and the session was dropped.
    Expired,
}

/// Owns the signed-in session for the whole client.
pub struct SessionManager {
    api: ApiClient,
    state: RwLock<Option<Session>>,
    store: Option<StateFile<Session>>,
}

impl SessionManager {
    pub fn new(config: &PortalConfig) -> Self {
        Self {
            api: ApiClient::new(config),
            state: RwLock::new(None),
            store: StateFile::in_dir(config.state_dir.as_deref(), SESSION_FILE),
        }
    }

    pub async fn current(&self) -> Option<Session> {
        self.state.read().await.clone()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn is_signed_in(&self) -> bool {
        self.state.read().await.is_some()
    }

    /// Reload a session saved by a previous run.
    ///
    /// Expired JWTs are refreshed when possible and dropped otherwise.
    /// Opaque tokens are kept as-is; the backend will reject them if stale.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<Option<User>, SessionError> {
        let Some(store) = &self.store else {
            return Ok(None);
        };
        let Some(session) = store.load().await else {
            debug!("No saved session");
            return Ok(None);
        };

        let expired = decode_claims(&session.access_token)
            .map(|claims| is_expired(&claims, Utc::now(), chrono::Duration::seconds(EXPIRY_LEEWAY_SECS)))
            .unwrap_or(false);

        let can_refresh = session.refresh_token.is_some();
        *self.state.write().await = Some(session);

        if expired {
            if !can_refresh {
                info!("Saved session expired and cannot be refreshed, signing out");
                self.clear().await;
                return Ok(None);
            }
            if self.refresh().await? == RefreshOutcome::Expired {
                return Ok(None);
            }
        }

        let user = self.current_user().await;
        if let Some(ref u) = user {
            info!("Restored session for user {}", u.id);
        }
        Ok(user)
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<Session, SessionError> {
        validate_email(&request.email)?;
        if request.password.is_empty() {
            return Err(SessionError::Invalid("Password is required".to_string()));
        }

        let response: AuthResponse = self.api
            .post("/api/auth/login", None, Some(json!({
                "email": request.email.trim(),
                "password": request.password
            })))
            .await?;

        self.establish(response).await
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<Session, SessionError> {
        if request.name.trim().is_empty() {
            return Err(SessionError::Invalid("Name is required".to_string()));
        }
        validate_email(&request.email)?;
        if request.password.len() < 8 {
            return Err(SessionError::Invalid("Password must be at least 8 characters".to_string()));
        }

        let response: AuthResponse = self.api
            .post("/api/auth/register", None, Some(json!({
                "name": request.name.trim(),
                "email": request.email.trim(),
                "password": request.password,
                "phone": request.phone,
                "city": request.city
            })))
            .await?;

        self.establish(response).await
    }

    /// Sign out locally. The backend is told when reachable, but a failure
    /// there never keeps the user signed in.
    pub async fn logout(&self) {
        if let Some(session) = self.current().await {
            let result: Result<serde_json::Value, _> = self.api
                .post("/api/auth/logout", Some(session.bearer()), None)
                .await;
            if let Err(e) = result {
                warn!("Backend logout failed, clearing local session anyway: {}", e);
            }
        }

        self.clear().await;
        info!("Signed out");
    }

    /// Exchange the current tokens for fresh ones.
    pub async fn refresh(&self) -> Result<RefreshOutcome, SessionError> {
        let Some(session) = self.current().await else {
            return Ok(RefreshOutcome::NoSession);
        };

        let body = json!({ "refresh_token": session.refresh_token });
        let response: AuthResponse = match self.api
            .post("/api/auth/refresh", Some(session.bearer()), Some(body))
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_auth_failure() => {
                if !self.replace_if_current(&session.access_token, None).await {
                    debug!("Session changed while refreshing, ignoring refusal");
                    return Ok(RefreshOutcome::NoSession);
                }
                info!("Token refresh refused ({}), signing out", e);
                return Ok(RefreshOutcome::Expired);
            }
            Err(e) => return Err(e.into()),
        };

        let refreshed = Session {
            user: response.user.unwrap_or_else(|| session.user.clone()),
            access_token: response.access_token,
            refresh_token: response.refresh_token.or_else(|| session.refresh_token.clone()),
            issued_at: Utc::now(),
        };
        if !self.replace_if_current(&session.access_token, Some(refreshed)).await {
            debug!("Session changed while refreshing, discarding new tokens");
            return Ok(RefreshOutcome::NoSession);
        }

        debug!("Access token refreshed");
        Ok(RefreshOutcome::Refreshed)
    }

    /// Refresh the tokens every `period` until the returned handle is cancelled.
    pub fn start_refresh(self: &Arc<Self>, period: Duration) -> ScheduledTask {
        let manager = Arc::clone(self);
        ScheduledTask::every("token-refresh", period, move || {
            let manager = Arc::clone(&manager);
            async move {
                match manager.refresh().await {
                    Ok(RefreshOutcome::NoSession) => debug!("No session to refresh"),
                    Ok(_) => {}
                    Err(e) => warn!("Token refresh failed, will retry next period: {}", e),
                }
            }
        })
    }

    async fn establish(&self, response: AuthResponse) -> Result<Session, SessionError> {
        let user = match response.user {
            Some(user) => user,
            None => decode_claims(&response.access_token)
                .map(|claims| user_from_claims(&claims))
                .map_err(|_| SessionError::MissingUser)?,
        };

        let session = Session {
            user,
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            issued_at: Utc::now(),
        };
        self.set(session.clone()).await;

        info!("Signed in as user {}", session.user.id);
        Ok(session)
    }

    async fn set(&self, session: Session) {
        let mut state = self.state.write().await;
        self.persist(Some(&session)).await;
        *state = Some(session);
    }

    async fn clear(&self) {
        let mut state = self.state.write().await;
        *state = None;
        self.persist(None).await;
    }

    /// Swap in `next` only while `expected` is still the active access token.
    /// A refresh that outlives a logout or a new login changes nothing.
    async fn replace_if_current(&self, expected: &str, next: Option<Session>) -> bool {
        let mut state = self.state.write().await;
        if state.as_ref().map(|s| s.access_token.as_str()) != Some(expected) {
            return false;
        }
        self.persist(next.as_ref()).await;
        *state = next;
        true
    }

    // Callers hold the state write lock so the file never lags behind memory.
    async fn persist(&self, session: Option<&Session>) {
        let Some(store) = &self.store else {
            return;
        };
        let result = match session {
            Some(session) => store.save(session).await,
            None => store.clear().await,
        };
        if let Err(e) = result {
            warn!("Failed to update saved session: {:#}", e);
        }
    }
}

#[async_trait]
impl TokenSource for SessionManager {
    async fn access_token(&self) -> Option<String> {
        self.state.read().await.as_ref().map(|s| s.access_token.clone())
    }
}

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is valid")
});

const MAX_EMAIL_LEN: usize = 254;

fn validate_email(email: &str) -> Result<(), SessionError> {
    let email = email.trim();

    if email.len() <= MAX_EMAIL_LEN && EMAIL_PATTERN.is_match(email) {
        Ok(())
    } else {
        Err(SessionError::Invalid("A valid email address is required".to_string()))
    }
}
