//! Shared types for record synchronization

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Failure code for records rejected by local attribute validation
pub const CODE_VALIDATION_FAILED: &str = "validation_failed";
/// Failure code when the remote error carries no usable code
pub const CODE_UNKNOWN_ERROR: &str = "unknown_error";
/// Failure code for an empty bulk batch
pub const CODE_NO_DATA: &str = "NO_DATA";
/// Failure code for a bulk batch that finished with record failures
pub const CODE_OPERATION_ERROR: &str = "operation_error";
/// Failure code for a record that was never admitted within the wait ceiling
pub const CODE_ADMISSION_TIMEOUT: &str = "admission_timeout";
/// HTTP status the platform answers when rate limiting
pub const STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// User record (caller side)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRecord {
    /// Caller-side user id
    pub user_id: String,
    /// Email address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Personal website
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Signup timestamp, passed through as the platform accepts it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_up_at: Option<String>,
    /// Timestamp of the last request made by the user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_request_at: Option<String>,
    /// IP address the user was last seen from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen_ip: Option<String>,
    /// User agent the user was last seen with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen_user_agent: Option<String>,
    /// Bare language code ("sv", "en"), see [`crate::text::sanitize_locale`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_override: Option<String>,
    /// Opt-out flag for email campaigns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsubscribed_from_emails: Option<bool>,
    /// Ask the platform to bump `last_request_at` to now
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_last_request_at: Option<bool>,
    /// Count this update as a new session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_session: Option<bool>,
    /// Companies the user belongs to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub companies: Vec<CompanyRef>,
    /// Free-form attributes, validated before any remote call
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub custom_attributes: Map<String, Value>,
}

impl UserRecord {
    /// Create a record with only the identity set
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    /// Set the language override from a raw locale ("sv-SE" becomes "sv")
    pub fn with_locale(mut self, locale: Option<&str>) -> Self {
        self.language_override = Some(crate::text::sanitize_locale(locale));
        self
    }
}

/// Company record (caller side)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Caller-side company id
    pub company_id: String,
    /// Creation timestamp in the originating system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_created_at: Option<String>,
    /// Company name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Headcount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    /// Subscription plan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    /// Company website
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Industry label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Monthly spend in the caller's currency
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_spend: Option<f64>,
    /// Free-form attributes, validated before any remote call
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub custom_attributes: Map<String, Value>,
}

impl CompanyRecord {
    /// Create a record with only the identity set
    pub fn new(company_id: impl Into<String>) -> Self {
        Self {
            company_id: company_id.into(),
            ..Self::default()
        }
    }
}

/// Reference to a company by caller-side id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyRef {
    /// Caller-side company id
    pub company_id: String,
}

/// Reference to a user by caller-side id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRef {
    /// Caller-side user id
    pub user_id: String,
}

/// Parameters for deleting a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteUser {
    /// Caller-side id of the user to delete
    pub user_id: String,
}

/// Parameters for tagging a single company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagCompany {
    /// Caller-side id of the company to tag
    pub company_id: String,
    /// Tag name to create or reuse
    pub tag: String,
}

/// Tag creation request attaching a tag to companies and/or users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRequest {
    /// Tag name to create or reuse
    pub name: String,
    /// Companies to attach the tag to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub companies: Vec<CompanyRef>,
    /// Users to attach the tag to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<UserRef>,
}

/// Success payload of a record operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessData {
    /// Caller-side id of the affected record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<String>,
    /// Id the platform assigned to the record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intercom_id: Option<String>,
    /// Raw response body
    pub result: Value,
}

/// Normalized failure payload of a record operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Failure {
    /// Machine-readable failure code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// One entry per underlying violation or remote error
    pub errors: Vec<String>,
    /// Caller-side id of the affected record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<String>,
    /// HTTP status of the remote rejection, when one was received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Raw upstream error payload, preserved for diagnosis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_error: Option<String>,
}

/// Uniform envelope returned by every record operation
///
/// Operations never raise for remote rejections; both sides of the outcome
/// come back through this envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OperationResult {
    /// The platform accepted the operation
    Success(SuccessData),
    /// The operation was rejected locally or remotely
    Failure(Failure),
}

impl OperationResult {
    /// True for the success side
    pub fn is_success(&self) -> bool {
        matches!(self, OperationResult::Success(_))
    }

    /// Success payload, if any
    pub fn success(&self) -> Option<&SuccessData> {
        match self {
            OperationResult::Success(data) => Some(data),
            OperationResult::Failure(_) => None,
        }
    }

    /// Failure payload, if any
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            OperationResult::Success(_) => None,
            OperationResult::Failure(failure) => Some(failure),
        }
    }
}

/// Summary of a bulk batch that synchronized every record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSummary {
    /// Batch id assigned by the coordinator
    pub batch_id: Uuid,
    /// Number of records synchronized
    pub synced: usize,
    /// When the batch started
    pub started_at: DateTime<Utc>,
    /// When the last record reached a terminal outcome
    pub completed_at: DateTime<Utc>,
}

/// Outcome of a bulk batch that failed outright or partially
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkFailure {
    /// Machine-readable failure code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Terminal failure of each record that did not synchronize
    pub errors: Vec<Failure>,
    /// Number of records that synchronized despite the failures
    pub synced: usize,
}

/// Envelope returned by bulk operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BulkResult {
    /// Every record synchronized
    Success(BulkSummary),
    /// The batch was empty or some records failed terminally
    Failure(BulkFailure),
}

impl BulkResult {
    /// True for the success side
    pub fn is_success(&self) -> bool {
        matches!(self, BulkResult::Success(_))
    }

    /// Failure payload, if any
    pub fn failure(&self) -> Option<&BulkFailure> {
        match self {
            BulkResult::Success(_) => None,
            BulkResult::Failure(failure) => Some(failure),
        }
    }
}
