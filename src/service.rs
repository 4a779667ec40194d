//! Record operations against the Intercom API
//!
//! Every public operation returns the uniform [`OperationResult`] envelope.
//! Remote rejections never surface as Rust errors: they are normalized into
//! the failure side of the envelope so callers always get a typed outcome.

use crate::bulk::BulkCoordinator;
use crate::client::{ApiResult, HttpApiClient, IntercomApi};
use crate::config::SyncConfig;
use crate::error::Result;
use crate::metrics::{SYNC_REQUESTS_TOTAL, SYNC_REQUEST_DURATION};
use crate::normalize::normalize_api_error;
use crate::types::{
    BulkResult, CompanyRecord, CompanyRef, DeleteUser, Failure, OperationResult, SuccessData,
    TagCompany, TagRequest, UserRecord, CODE_VALIDATION_FAILED,
};
use crate::validate::validate_custom_attributes;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub(crate) const OP_CREATE_USER: &str = "create_or_update_user";
pub(crate) const OP_CREATE_COMPANY: &str = "create_or_update_company";
pub(crate) const OP_DELETE_USER: &str = "delete_user";
pub(crate) const OP_TAG_COMPANY: &str = "tag_company";
pub(crate) const OP_TAG_MULTIPLE: &str = "tag_multiple";

/// Client-side adapter synchronizing records into Intercom
#[derive(Clone)]
pub struct SyncService {
    client: Arc<dyn IntercomApi>,
    config: SyncConfig,
}

impl SyncService {
    /// Create a service backed by the real HTTP transport
    pub fn new(config: SyncConfig) -> Result<Self> {
        let client = HttpApiClient::new(
            config.api_base_url.as_str(),
            config.token.as_str(),
            Duration::from_secs(config.request_timeout_seconds),
        )?;
        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    /// Create a service backed by an injected client
    pub fn with_client(client: Arc<dyn IntercomApi>, config: SyncConfig) -> Self {
        Self { client, config }
    }

    /// Create a user, or update it when the identity already exists
    ///
    /// Custom attributes are validated locally first; a record that fails
    /// validation never reaches the platform.
    pub async fn create_or_update_user(&self, user: &UserRecord) -> OperationResult {
        let validation = validate_custom_attributes(&user.custom_attributes);
        if !validation.validated {
            return self.validation_failure(OP_CREATE_USER, &user.user_id, validation.errors);
        }

        self.remote_call(
            OP_CREATE_USER,
            Some(user.user_id.clone()),
            format!(
                "Error when creating/updating user with id '{}' in Intercom",
                user.user_id
            ),
            self.client.create_user(user),
        )
        .await
    }

    /// Create a company, or update it when the identity already exists
    pub async fn create_or_update_company(&self, company: &CompanyRecord) -> OperationResult {
        let validation = validate_custom_attributes(&company.custom_attributes);
        if !validation.validated {
            return self.validation_failure(OP_CREATE_COMPANY, &company.company_id, validation.errors);
        }

        self.remote_call(
            OP_CREATE_COMPANY,
            Some(company.company_id.clone()),
            format!(
                "Error when creating/updating company with id '{}' in Intercom",
                company.company_id
            ),
            self.client.create_company(company),
        )
        .await
    }

    /// Delete a user
    pub async fn delete_user(&self, params: &DeleteUser) -> OperationResult {
        self.remote_call(
            OP_DELETE_USER,
            Some(params.user_id.clone()),
            format!(
                "Error when deleting user with id '{}' in Intercom",
                params.user_id
            ),
            self.client.delete_user(params),
        )
        .await
    }

    /// Create a tag and attach it to a single company
    pub async fn tag_company(&self, params: &TagCompany) -> OperationResult {
        let request = TagRequest {
            name: params.tag.clone(),
            companies: vec![CompanyRef {
                company_id: params.company_id.clone(),
            }],
            users: Vec::new(),
        };

        self.remote_call(
            OP_TAG_COMPANY,
            Some(params.company_id.clone()),
            format!(
                "Error when tagging company with id '{}' in Intercom",
                params.company_id
            ),
            self.client.tag(&request),
        )
        .await
    }

    /// Create a tag and attach it to many companies and/or users at once
    pub async fn tag_multiple(&self, request: &TagRequest) -> OperationResult {
        self.remote_call(
            OP_TAG_MULTIPLE,
            None,
            "Error when creating/updating tags in Intercom".to_string(),
            self.client.tag(request),
        )
        .await
    }

    /// Update many users as one rate-limited batch
    ///
    /// See [`BulkCoordinator`] for admission, retry and aggregation rules.
    pub async fn update_users_in_bulk(&self, users: &[UserRecord]) -> BulkResult {
        BulkCoordinator::new(self.clone(), self.config.bulk.clone())
            .run(users.to_vec())
            .await
    }

    async fn remote_call<F>(
        &self,
        operation: &'static str,
        internal_id: Option<String>,
        fallback_message: String,
        call: F,
    ) -> OperationResult
    where
        F: Future<Output = ApiResult>,
    {
        let start = Instant::now();
        let result = call.await;
        SYNC_REQUEST_DURATION
            .with_label_values(&[operation])
            .observe(start.elapsed().as_secs_f64());

        match result {
            Ok(response) => {
                SYNC_REQUESTS_TOTAL
                    .with_label_values(&[operation, "success"])
                    .inc();
                debug!("{} succeeded for {:?}", operation, internal_id);
                OperationResult::Success(SuccessData {
                    internal_id,
                    intercom_id: extract_remote_id(&response.body),
                    result: response.body,
                })
            }
            Err(error) => {
                SYNC_REQUESTS_TOTAL
                    .with_label_values(&[operation, "failure"])
                    .inc();
                let failure =
                    normalize_api_error(&error, &fallback_message, internal_id.as_deref());
                warn!(
                    "{} failed for {:?}: {} ({})",
                    operation, failure.internal_id, failure.message, failure.code
                );
                OperationResult::Failure(failure)
            }
        }
    }

    fn validation_failure(
        &self,
        operation: &'static str,
        internal_id: &str,
        errors: Vec<String>,
    ) -> OperationResult {
        warn!(
            "{} rejected record '{}' before any remote call: {:?}",
            operation, internal_id, errors
        );
        SYNC_REQUESTS_TOTAL
            .with_label_values(&[operation, "validation_failed"])
            .inc();
        OperationResult::Failure(Failure {
            code: CODE_VALIDATION_FAILED.to_string(),
            message: "Custom attributes failed validation".to_string(),
            errors,
            internal_id: Some(internal_id.to_string()),
            status_code: None,
            original_error: None,
        })
    }
}

fn extract_remote_id(body: &Value) -> Option<String> {
    match body.get("id") {
        Some(Value::String(id)) => Some(id.clone()),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    }
}
