//! Bulk user synchronization binary
//!
//! Reads a JSON file of user records and pushes them to Intercom as one
//! rate-limited batch:
//!
//! ```text
//! INTERCOM_SYNC_TOKEN=... bulk_sync users.json
//! ```

use anyhow::{bail, Context};
use intercom_sync::{BulkResult, SyncConfig, SyncService, UserRecord};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: bulk_sync <users.json>")?;

    let config = SyncConfig::from_env()?;
    if config.token.is_empty() {
        bail!("INTERCOM_SYNC_TOKEN is not set");
    }

    let content =
        std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
    let users: Vec<UserRecord> =
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path))?;
    info!("Loaded {} users from {}", users.len(), path);

    let service = SyncService::new(config)?;
    match service.update_users_in_bulk(&users).await {
        BulkResult::Success(summary) => {
            info!(
                "Batch {} synced {} users in {}ms",
                summary.batch_id,
                summary.synced,
                (summary.completed_at - summary.started_at).num_milliseconds()
            );
            Ok(())
        }
        BulkResult::Failure(failure) => {
            for record_error in &failure.errors {
                error!(
                    "{}: {} ({})",
                    record_error.internal_id.as_deref().unwrap_or("<unknown>"),
                    record_error.message,
                    record_error.code
                );
            }
            bail!(
                "bulk update failed ({}): {} synced, {} failed",
                failure.code,
                failure.synced,
                failure.errors.len()
            );
        }
    }
}
