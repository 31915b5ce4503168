use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use shared_api_client::{api_path, ApiClient};
use shared_config::PortalConfig;
use shared_models::auth::TokenSource;
use shared_utils::ScheduledTask;

use crate::models::Notification;

const CHANNEL_CAPACITY: usize = 100;

#[derive(Default)]
struct Inbox {
    latest: Vec<Notification>,
    seen: HashSet<String>,
}

/// Keeps the user's notification list current and announces new arrivals.
pub struct NotificationCenter {
    api: ApiClient,
    inbox: RwLock<Inbox>,
    sender: broadcast::Sender<Notification>,
}

impl NotificationCenter {
    pub fn new(config: &PortalConfig) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);

        Self {
            api: ApiClient::new(config),
            inbox: RwLock::new(Inbox::default()),
            sender,
        }
    }

    /// Receives every notification the first time a poll sees it.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub async fn latest(&self) -> Vec<Notification> {
        self.inbox.read().await.latest.clone()
    }

    pub async fn unread_count(&self) -> usize {
        self.inbox.read().await.latest.iter().filter(|n| !n.is_read()).count()
    }

    /// Fetch the list once, returning how many notifications were new.
    pub async fn poll_once(&self, token: &str) -> Result<usize> {
        let notifications: Vec<Notification> = self.api
            .get("/api/notifications", &[], Some(token))
            .await?;

        let mut inbox = self.inbox.write().await;
        let fresh: Vec<Notification> = notifications
            .iter()
            .filter(|n| !inbox.seen.contains(&n.id))
            .cloned()
            .collect();
        // Only ids the backend still returns are remembered
        inbox.seen = notifications.iter().map(|n| n.id.clone()).collect();
        inbox.latest = notifications;
        drop(inbox);

        for notification in &fresh {
            // No subscribers is fine; the list is still kept.
            let _ = self.sender.send(notification.clone());
        }

        if !fresh.is_empty() {
            debug!("Received {} new notification(s)", fresh.len());
        }
        Ok(fresh.len())
    }

    pub async fn mark_read(&self, notification_id: &str, token: &str) -> Result<()> {
        let path = api_path(&["api", "notifications", notification_id, "read"])?;
        let _: serde_json::Value = self.api.patch(&path, Some(token), None).await?;

        let mut inbox = self.inbox.write().await;
        if let Some(n) = inbox.latest.iter_mut().find(|n| n.id == notification_id) {
            n.read_at.get_or_insert_with(Utc::now);
        }

        debug!("Marked notification {} as read", notification_id);
        Ok(())
    }

    /// Forget the current user's notifications.
    pub async fn reset(&self) {
        *self.inbox.write().await = Inbox::default();
    }

    /// Poll every `period` while a session is active. Ticks without a
    /// session clear whatever the previous user left behind.
    pub fn start_polling(
        self: &Arc<Self>,
        tokens: Arc<dyn TokenSource>,
        period: Duration,
    ) -> ScheduledTask {
        let center = Arc::clone(self);
        info!("Starting notification polling");

        ScheduledTask::every("notification-poll", period, move || {
            let center = Arc::clone(&center);
            let tokens = Arc::clone(&tokens);
            async move {
                let Some(token) = tokens.access_token().await else {
                    debug!("No active session, skipping notification poll");
                    center.reset().await;
                    return;
                };
                if let Err(e) = center.poll_once(&token).await {
                    warn!("Notification poll failed: {:#}", e);
                }
            }
        })
    }
}
