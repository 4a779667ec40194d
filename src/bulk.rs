//! Bulk user updates
//!
//! The coordinator fans a batch out into one task per record. Every task is
//! gated by a shared windowed admission limiter and an in-flight bound.
//! Rate-limit answers (429) push the whole batch back and re-admit the
//! record for a bounded number of attempts. Every record reaches exactly
//! one terminal outcome; failures aggregate in completion order.

use crate::config::BulkConfig;
use crate::limiter::{AdmissionLimiter, LimiterConfig};
use crate::metrics::{BULK_IN_FLIGHT, BULK_RETRIES_TOTAL};
use crate::service::{SyncService, OP_CREATE_USER};
use crate::types::{
    BulkFailure, BulkResult, BulkSummary, Failure, OperationResult, UserRecord,
    CODE_ADMISSION_TIMEOUT, CODE_NO_DATA, CODE_OPERATION_ERROR, CODE_UNKNOWN_ERROR,
    STATUS_TOO_MANY_REQUESTS,
};
use backoff::backoff::Backoff;
use backoff::ExponentialBackoffBuilder;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Coordinates one bulk batch of user updates
///
/// A coordinator owns its admission state outright: two concurrent batches
/// never slow each other down.
pub struct BulkCoordinator {
    service: SyncService,
    config: BulkConfig,
}

impl BulkCoordinator {
    /// Create a coordinator for one batch
    pub fn new(service: SyncService, config: BulkConfig) -> Self {
        Self { service, config }
    }

    /// Run the batch until every record reaches a terminal outcome
    pub async fn run(&self, users: Vec<UserRecord>) -> BulkResult {
        let batch_id = Uuid::new_v4();
        let started_at = Utc::now();

        if users.is_empty() {
            return BulkResult::Failure(BulkFailure {
                code: CODE_NO_DATA.to_string(),
                message: "The incoming batch of users was empty, nothing to do".to_string(),
                errors: Vec::new(),
                synced: 0,
            });
        }

        let total = users.len();
        info!("Starting bulk update {} with {} users", batch_id, total);

        let limiter = Arc::new(AdmissionLimiter::new(LimiterConfig::from(&self.config)));
        let semaphore = Arc::new(Semaphore::new(self.config.max_in_flight));
        let (tx, mut rx) = mpsc::unbounded_channel();

        for user in users {
            let worker = RecordWorker {
                service: self.service.clone(),
                config: self.config.clone(),
                limiter: Arc::clone(&limiter),
                semaphore: Arc::clone(&semaphore),
            };
            let tx = tx.clone();
            tokio::spawn(async move {
                let outcome = worker.sync_one(user).await;
                let _ = tx.send(outcome);
            });
        }
        drop(tx);

        // Aggregation ends when every sender is gone, so a record can never
        // be dropped from the tally. Failures land in completion order.
        let mut errors = Vec::new();
        let mut synced = 0usize;
        while let Some(outcome) = rx.recv().await {
            match outcome {
                Ok(()) => synced += 1,
                Err(failure) => errors.push(failure),
            }
        }

        let completed_at = Utc::now();
        if errors.is_empty() {
            info!("Bulk update {} synced all {} users", batch_id, synced);
            BulkResult::Success(BulkSummary {
                batch_id,
                synced,
                started_at,
                completed_at,
            })
        } else {
            warn!(
                "Bulk update {} finished with {} failures, {} synced",
                batch_id,
                errors.len(),
                synced
            );
            BulkResult::Failure(BulkFailure {
                code: CODE_OPERATION_ERROR.to_string(),
                message: "The bulk operation experienced errors. See the errors list for more information"
                    .to_string(),
                errors,
                synced,
            })
        }
    }
}

struct RecordWorker {
    service: SyncService,
    config: BulkConfig,
    limiter: Arc<AdmissionLimiter>,
    semaphore: Arc<Semaphore>,
}

impl RecordWorker {
    /// Drive one record to a terminal outcome
    async fn sync_one(&self, user: UserRecord) -> std::result::Result<(), Failure> {
        let mut attempts: u32 = 0;
        let mut retry_delay = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_secs(self.config.backoff_seconds))
            .with_max_interval(Duration::from_secs(self.config.backoff_seconds * 4))
            .with_max_elapsed_time(None)
            .build();

        loop {
            if let Err(timeout) = self.limiter.acquire(OP_CREATE_USER).await {
                warn!("User '{}' was never admitted: {}", user.user_id, timeout);
                let message = timeout.to_string();
                return Err(Failure {
                    code: CODE_ADMISSION_TIMEOUT.to_string(),
                    message: message.clone(),
                    errors: vec![message],
                    internal_id: Some(user.user_id.clone()),
                    status_code: None,
                    original_error: None,
                });
            }

            // The batch never closes the semaphore while workers hold it.
            let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(closed) => {
                    return Err(Failure {
                        code: CODE_UNKNOWN_ERROR.to_string(),
                        message: closed.to_string(),
                        errors: vec![closed.to_string()],
                        internal_id: Some(user.user_id.clone()),
                        status_code: None,
                        original_error: None,
                    });
                }
            };

            attempts += 1;
            BULK_IN_FLIGHT.inc();
            let result = self.service.create_or_update_user(&user).await;
            BULK_IN_FLIGHT.dec();
            drop(permit);

            match result {
                OperationResult::Success(_) => {
                    debug!("User '{}' synced after {} attempt(s)", user.user_id, attempts);
                    return Ok(());
                }
                OperationResult::Failure(failure)
                    if failure.status_code == Some(STATUS_TOO_MANY_REQUESTS) =>
                {
                    if attempts >= self.config.max_retry_attempts {
                        warn!(
                            "User '{}' still rate limited after {} attempts, giving up",
                            user.user_id, attempts
                        );
                        return Err(failure);
                    }

                    BULK_RETRIES_TOTAL.with_label_values(&[OP_CREATE_USER]).inc();
                    self.limiter.backoff().await;
                    let delay = retry_delay
                        .next_backoff()
                        .unwrap_or(Duration::from_secs(self.config.backoff_seconds));
                    warn!(
                        "User '{}' rate limited (attempt {}/{}), retrying in {:?}",
                        user.user_id, attempts, self.config.max_retry_attempts, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                OperationResult::Failure(failure) => {
                    error!(
                        "User '{}' failed terminally: {} ({})",
                        user.user_id, failure.message, failure.code
                    );
                    return Err(failure);
                }
            }
        }
    }
}
