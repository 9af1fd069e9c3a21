use std::time::Duration;

use anyhow::{Context, Result};
use statesync_id::AppGuid;
use statesync_reconcile::{DEFAULT_ESCALATION_THRESHOLD, DEFAULT_STORE_TIMEOUT, DEFAULT_SYNC_INTERVAL};

#[derive(Debug, Clone)]
pub struct Config {
    pub desired_state_url: String,
    pub desired_state_token: Option<String>,
    pub scheduler_url: String,
    pub routing_url: String,
    pub lrp_interval: Duration,
    pub routes_interval: Duration,
    pub store_timeout: Duration,
    pub max_in_flight: usize,
    pub escalation_threshold: u32,
    pub freshness_domain: String,
    pub app_filter: Option<AppGuid>,
    pub once: bool,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let desired_state_url = std::env::var("SYNC_DESIRED_STATE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8081".to_string());

        let desired_state_token = std::env::var("SYNC_DESIRED_STATE_TOKEN").ok();

        let scheduler_url = std::env::var("SYNC_SCHEDULER_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8082".to_string());

        let routing_url = std::env::var("SYNC_ROUTING_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8083".to_string());

        let lrp_interval = env_duration_secs("SYNC_LRP_INTERVAL_SECS", DEFAULT_SYNC_INTERVAL)?;
        let routes_interval =
            env_duration_secs("SYNC_ROUTES_INTERVAL_SECS", DEFAULT_SYNC_INTERVAL)?;
        let store_timeout = env_duration_secs("SYNC_STORE_TIMEOUT_SECS", DEFAULT_STORE_TIMEOUT)?;

        let max_in_flight = match std::env::var("SYNC_MAX_IN_FLIGHT") {
            Ok(v) => v
                .parse::<usize>()
                .context("SYNC_MAX_IN_FLIGHT must be a positive integer")?,
            Err(_) => 8,
        };

        let escalation_threshold = match std::env::var("SYNC_ESCALATION_SWEEPS") {
            Ok(v) => v
                .parse::<u32>()
                .context("SYNC_ESCALATION_SWEEPS must be a positive integer")?,
            Err(_) => DEFAULT_ESCALATION_THRESHOLD,
        };

        let freshness_domain =
            std::env::var("SYNC_FRESHNESS_DOMAIN").unwrap_or_else(|_| "apps".to_string());

        let app_filter = match std::env::var("SYNC_APP_FILTER") {
            Ok(v) => Some(
                v.parse::<AppGuid>()
                    .context("SYNC_APP_FILTER must be an application GUID")?,
            ),
            Err(_) => None,
        };

        let once = std::env::var("SYNC_ONCE")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        let log_level = std::env::var("SYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            desired_state_url,
            desired_state_token,
            scheduler_url,
            routing_url,
            lrp_interval,
            routes_interval,
            store_timeout,
            max_in_flight,
            escalation_threshold,
            freshness_domain,
            app_filter,
            once,
            log_level,
        })
    }
}

fn env_duration_secs(key: &str, default: Duration) -> Result<Duration> {
    match std::env::var(key) {
        Ok(v) => {
            let secs = v
                .parse::<u64>()
                .with_context(|| format!("{key} must be an integer number of seconds"))?;
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_duration_falls_back_to_default() {
        let d = env_duration_secs("SYNC_TEST_UNSET_INTERVAL", Duration::from_secs(30)).unwrap();
        assert_eq!(d, Duration::from_secs(30));
    }

    #[test]
    fn test_env_duration_parses_seconds() {
        std::env::set_var("SYNC_TEST_SET_INTERVAL", "7");
        let d = env_duration_secs("SYNC_TEST_SET_INTERVAL", Duration::from_secs(30)).unwrap();
        std::env::remove_var("SYNC_TEST_SET_INTERVAL");
        assert_eq!(d, Duration::from_secs(7));
    }

    #[test]
    fn test_env_duration_rejects_garbage() {
        std::env::set_var("SYNC_TEST_BAD_INTERVAL", "soon");
        let result = env_duration_secs("SYNC_TEST_BAD_INTERVAL", Duration::from_secs(30));
        std::env::remove_var("SYNC_TEST_BAD_INTERVAL");
        assert!(result.is_err());
    }
}
