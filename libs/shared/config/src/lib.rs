use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::FixedOffset;
use tracing::warn;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub notification_poll_secs: u64,
    pub token_refresh_secs: u64,
    pub clinic_utc_offset_minutes: i32,
    pub state_dir: Option<PathBuf>,
    pub listen_addr: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 30,
            max_retries: 2,
            notification_poll_secs: 60,
            token_refresh_secs: 14 * 60,
            clinic_utc_offset_minutes: 0,
            state_dir: None,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
        }
    }
}

impl PortalConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            api_base_url: env::var("PORTAL_API_URL")
                .unwrap_or_else(|_| {
                    warn!("PORTAL_API_URL not set, using default {}", DEFAULT_API_URL);
                    defaults.api_base_url.clone()
                }),
            request_timeout_secs: parse_var("PORTAL_REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            max_retries: parse_var("PORTAL_MAX_RETRIES", defaults.max_retries),
            notification_poll_secs: parse_var("PORTAL_NOTIFICATION_POLL_SECS", defaults.notification_poll_secs),
            token_refresh_secs: parse_var("PORTAL_TOKEN_REFRESH_SECS", defaults.token_refresh_secs),
            clinic_utc_offset_minutes: parse_var(
                "PORTAL_CLINIC_UTC_OFFSET_MINUTES",
                defaults.clinic_utc_offset_minutes,
            ),
            state_dir: env::var("PORTAL_STATE_DIR").ok().map(PathBuf::from),
            listen_addr: env::var("PORTAL_LISTEN_ADDR")
                .unwrap_or(defaults.listen_addr),
        };

        if config.state_dir.is_none() {
            warn!("PORTAL_STATE_DIR not set, session and preferences will not survive restarts");
        }

        if !config.is_configured() {
            warn!("Portal not fully configured - check PORTAL_* environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.api_base_url.is_empty() && self.clinic_timezone().is_some()
    }

    /// Fixed offset all schedule times are interpreted in.
    pub fn clinic_timezone(&self) -> Option<FixedOffset> {
        self.clinic_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn notification_poll_interval(&self) -> Duration {
        Duration::from_secs(self.notification_poll_secs)
    }

    pub fn token_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.token_refresh_secs)
    }
}

fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_intervals() {
        let config = PortalConfig::default();

        assert_eq!(config.notification_poll_interval(), Duration::from_secs(60));
        assert_eq!(config.token_refresh_interval(), Duration::from_secs(840));
        assert!(config.is_configured());
    }

    #[test]
    fn test_clinic_timezone_offset() {
        let config = PortalConfig {
            clinic_utc_offset_minutes: 120,
            ..PortalConfig::default()
        };

        assert_eq!(config.clinic_timezone().unwrap().local_minus_utc(), 7200);
    }

    #[test]
    fn test_out_of_range_offset_is_not_configured() {
        let config = PortalConfig {
            clinic_utc_offset_minutes: 48 * 60,
            ..PortalConfig::default()
        };

        assert!(config.clinic_timezone().is_none());
        assert!(!config.is_configured());

        let config = PortalConfig {
            clinic_utc_offset_minutes: 40_000_000,
            ..PortalConfig::default()
        };

        assert!(config.clinic_timezone().is_none());
        assert!(!config.is_configured());
    }
}
