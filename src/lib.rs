//! # Intercom Sync
//!
//! Client-side adapter that synchronizes user and company records into
//! Intercom, with:
//! - Custom-attribute validation against the platform limits
//! - Typed normalization of upstream error shapes
//! - Uniform, non-throwing operation envelopes
//! - Rate-limited bulk updates with bounded 429 retry
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                  Sync Service                    │
//! │  create/update user · company · delete · tag    │
//! └───────┬──────────────────────────────┬───────────┘
//!         │                              │
//! ┌───────▼────────┐            ┌────────▼─────────┐
//! │   Attribute    │            │ Bulk Coordinator │
//! │   Validator    │            │ (admission +     │
//! └───────┬────────┘            │  429 retry)      │
//!         │                     └────────┬─────────┘
//! ┌───────▼──────────────────────────────▼──────────┐
//! │        Intercom API client (REST, bearer)       │
//! │          + error-shape normalization            │
//! └──────────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod bulk;
pub mod client;
pub mod config;
pub mod error;
pub mod limiter;
pub mod metrics;
pub mod normalize;
pub mod service;
pub mod text;
pub mod types;
pub mod validate;

pub use bulk::BulkCoordinator;
pub use client::{ApiError, ApiResponse, ApiResult, HttpApiClient, IntercomApi};
pub use config::{BulkConfig, SyncConfig};
pub use error::{Error, Result};
pub use limiter::{AdmissionLimiter, LimiterConfig};
pub use service::SyncService;
pub use types::*;
pub use validate::{validate_custom_attributes, ValidationResult};

/// Default operations admitted per bulk window
pub const DEFAULT_BULK_RATE: u32 = 80;

/// Default bulk admission window (seconds)
pub const DEFAULT_BULK_INTERVAL_SECONDS: u64 = 10;

/// Default pushback after a 429 answer (seconds)
pub const DEFAULT_BULK_BACKOFF_SECONDS: u64 = 10;

/// Default ceiling on one operation's admission wait (seconds)
pub const DEFAULT_BULK_MAX_WAITING_SECONDS: u64 = 300;

/// Default total attempts per record under rate limiting
pub const DEFAULT_MAX_RETRY_ATTEMPTS: u32 = 3;

/// Default bound on operations running at once in a batch
pub const DEFAULT_BULK_MAX_IN_FLIGHT: usize = 80;

/// Default request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
