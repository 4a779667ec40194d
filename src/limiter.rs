//! Windowed admission control
//!
//! At most `rate` operations are admitted per `interval`; operations beyond
//! that wait for a later window. A shared pushback holds the whole batch
//! back after the platform answers 429. An operation whose projected wait
//! exceeds `max_waiting` fails locally instead of stalling the batch.

use crate::config::BulkConfig;
use crate::error::{Error, Result};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Admission limiter configuration
#[derive(Debug, Clone)]
pub struct LimiterConfig {
    /// Admissions per window
    pub rate: u32,
    /// Window length
    pub interval: Duration,
    /// Pushback applied after a rate-limit response
    pub backoff: Duration,
    /// Ceiling on the total wait for one admission
    pub max_waiting: Duration,
}

impl From<&BulkConfig> for LimiterConfig {
    fn from(config: &BulkConfig) -> Self {
        Self {
            rate: config.rate,
            interval: Duration::from_secs(config.interval_seconds),
            backoff: Duration::from_secs(config.backoff_seconds),
            max_waiting: Duration::from_secs(config.max_waiting_seconds),
        }
    }
}

#[derive(Debug)]
struct WindowState {
    window_start: Instant,
    admitted: u32,
    backoff_until: Option<Instant>,
}

/// Windowed admission limiter
///
/// One instance belongs to exactly one bulk batch; batches never share
/// admission state.
pub struct AdmissionLimiter {
    state: Mutex<WindowState>,
    config: LimiterConfig,
}

impl AdmissionLimiter {
    /// Create a limiter with a fresh window starting now
    pub fn new(config: LimiterConfig) -> Self {
        Self {
            state: Mutex::new(WindowState {
                window_start: Instant::now(),
                admitted: 0,
                backoff_until: None,
            }),
            config,
        }
    }

    /// Wait for an admission slot
    ///
    /// Returns [`Error::Timeout`] when the projected wait exceeds the
    /// configured ceiling; callers treat that as a local terminal failure
    /// for the operation named in `operation`.
    pub async fn acquire(&self, operation: &str) -> Result<()> {
        let started = Instant::now();

        loop {
            let wait_until = {
                let mut state = self.state.lock().await;
                let now = Instant::now();

                if let Some(until) = state.backoff_until {
                    if until <= now {
                        state.backoff_until = None;
                    }
                }

                match state.backoff_until {
                    Some(until) => until,
                    None => {
                        if now.duration_since(state.window_start) >= self.config.interval {
                            state.window_start = now;
                            state.admitted = 0;
                        }
                        if state.admitted < self.config.rate {
                            state.admitted += 1;
                            return Ok(());
                        }
                        state.window_start + self.config.interval
                    }
                }
            };

            if wait_until.duration_since(started) > self.config.max_waiting {
                return Err(Error::Timeout {
                    seconds: self.config.max_waiting.as_secs(),
                    operation: operation.to_string(),
                });
            }

            tokio::time::sleep_until(wait_until).await;
        }
    }

    /// Push all admissions back after a rate-limit response
    ///
    /// An already-pending later pushback is kept; pushbacks never shorten.
    pub async fn backoff(&self) {
        let mut state = self.state.lock().await;
        let until = Instant::now() + self.config.backoff;
        match state.backoff_until {
            Some(existing) if existing >= until => {}
            _ => state.backoff_until = Some(until),
        }
    }
}
