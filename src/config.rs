//! Configuration for the sync adapter

use serde::{Deserialize, Serialize};

/// Sync adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Intercom REST API base URL
    pub api_base_url: String,

    /// Access token used as the bearer credential
    pub token: String,

    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,

    /// Bulk pipeline configuration
    pub bulk: BulkConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.intercom.io".to_string(),
            token: String::new(),
            request_timeout_seconds: crate::DEFAULT_REQUEST_TIMEOUT_SECONDS,
            bulk: BulkConfig::default(),
        }
    }
}

/// Bulk pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkConfig {
    /// Operations admitted per window
    pub rate: u32,

    /// Admission window length in seconds
    pub interval_seconds: u64,

    /// Pushback in seconds applied to the whole batch after the platform
    /// answers 429
    pub backoff_seconds: u64,

    /// Ceiling in seconds on how long one operation may wait for admission
    pub max_waiting_seconds: u64,

    /// Total attempts per record (the first call included) before a
    /// rate-limited record becomes a terminal failure
    pub max_retry_attempts: u32,

    /// Maximum operations running at once
    pub max_in_flight: usize,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            rate: crate::DEFAULT_BULK_RATE,
            interval_seconds: crate::DEFAULT_BULK_INTERVAL_SECONDS,
            backoff_seconds: crate::DEFAULT_BULK_BACKOFF_SECONDS,
            max_waiting_seconds: crate::DEFAULT_BULK_MAX_WAITING_SECONDS,
            max_retry_attempts: crate::DEFAULT_MAX_RETRY_ATTEMPTS,
            max_in_flight: crate::DEFAULT_BULK_MAX_IN_FLIGHT,
        }
    }
}

impl SyncConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SyncConfig = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = SyncConfig::default();

        if let Ok(url) = std::env::var("INTERCOM_SYNC_BASE_URL") {
            config.api_base_url = url;
        }

        if let Ok(token) = std::env::var("INTERCOM_SYNC_TOKEN") {
            config.token = token;
        }

        if let Ok(timeout) = std::env::var("INTERCOM_SYNC_TIMEOUT_SECONDS") {
            config.request_timeout_seconds = timeout.parse().map_err(|_| {
                crate::Error::Config(format!(
                    "Invalid INTERCOM_SYNC_TIMEOUT_SECONDS: {}",
                    timeout
                ))
            })?;
        }

        if let Ok(rate) = std::env::var("INTERCOM_SYNC_BULK_RATE") {
            config.bulk.rate = rate
                .parse()
                .map_err(|_| crate::Error::Config(format!("Invalid INTERCOM_SYNC_BULK_RATE: {}", rate)))?;
        }

        Ok(config)
    }
}
