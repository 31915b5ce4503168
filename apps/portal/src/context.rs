use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use notification_cell::NotificationCenter;
use session_cell::SessionManager;
use shared_config::PortalConfig;
use shared_models::auth::TokenSource;
use shared_utils::{ScheduledTask, StateFile};

use crate::preferences::Preferences;

const PREFERENCES_FILE: &str = "preferences.json";

/// Everything the portal shares between requests and background tasks.
///
/// Built once by [`AppContext::init`] and torn down with
/// [`AppContext::dispose`]; there is no other global state.
pub struct AppContext {
    pub config: Arc<PortalConfig>,
    pub sessions: Arc<SessionManager>,
    pub notifications: Arc<NotificationCenter>,
    preferences: RwLock<Preferences>,
    preferences_store: Option<StateFile<Preferences>>,
    tasks: Mutex<Vec<ScheduledTask>>,
}

impl AppContext {
    /// Restore saved state and start the background tasks.
    ///
    /// A failed session restore is logged and the portal starts signed out.
    pub async fn init(config: PortalConfig) -> Arc<Self> {
        let config = Arc::new(config);
        if !config.is_configured() {
            warn!("PORTAL_API_URL is not set, backend calls will fail");
        }

        let sessions = Arc::new(SessionManager::new(&config));
        match sessions.restore().await {
            Ok(Some(user)) => info!("Resumed session for user {}", user.id),
            Ok(None) => info!("Starting signed out"),
            Err(e) => warn!("Could not restore saved session: {}", e),
        }

        let preferences_store = StateFile::in_dir(config.state_dir.as_deref(), PREFERENCES_FILE);
        let preferences = match &preferences_store {
            Some(store) => store.load().await.unwrap_or_default(),
            None => Preferences::default(),
        };

        let notifications = Arc::new(NotificationCenter::new(&config));

        let tokens: Arc<dyn TokenSource> = sessions.clone();
        let tasks = vec![
            sessions.start_refresh(config.token_refresh_interval()),
            notifications.start_polling(tokens, config.notification_poll_interval()),
        ];

        info!("Application context ready");
        Arc::new(Self {
            config,
            sessions,
            notifications,
            preferences: RwLock::new(preferences),
            preferences_store,
            tasks: Mutex::new(tasks),
        })
    }

    pub async fn preferences(&self) -> Preferences {
        self.preferences.read().await.clone()
    }

    pub async fn set_preferences(&self, preferences: Preferences) {
        *self.preferences.write().await = preferences;
        self.flush_preferences().await;
    }

    /// Number of background tasks still running.
    pub async fn active_tasks(&self) -> usize {
        self.tasks.lock().await.iter().filter(|t| !t.is_cancelled()).count()
    }

    /// Stop the background tasks and write preferences out. Safe to call twice.
    pub async fn dispose(&self) {
        let tasks: Vec<ScheduledTask> = self.tasks.lock().await.drain(..).collect();
        for task in tasks {
            info!("Stopping {}", task.name());
            task.shutdown().await;
        }

        self.flush_preferences().await;
        info!("Application context disposed");
    }

    async fn flush_preferences(&self) {
        let Some(store) = &self.preferences_store else {
            return;
        };
        let preferences = self.preferences().await;
        if let Err(e) = store.save(&preferences).await {
            warn!("Failed to save preferences: {:#}", e);
        }
    }
}
