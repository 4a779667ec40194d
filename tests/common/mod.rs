//! Shared test fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use intercom_sync::{
    ApiError, ApiResponse, ApiResult, CompanyRecord, DeleteUser, IntercomApi, TagRequest,
    UserRecord,
};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::{json, Value};
use std::sync::Mutex;

type Responder = dyn Fn(&str, Value) -> ApiResult + Send + Sync;

/// Scriptable stand-in for the remote client
///
/// Records every call it receives and answers through the configured
/// responder, which gets the operation name and the serialized payload.
pub struct MockApi {
    calls: Mutex<Vec<String>>,
    responder: Box<Responder>,
}

impl MockApi {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, Value) -> ApiResult + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// Mock echoing the payload back with the given platform id attached
    pub fn echo_with_id(id: &str) -> Self {
        let id = id.to_string();
        Self::new(move |_operation, payload| {
            let mut body = payload;
            if let Some(object) = body.as_object_mut() {
                object.insert("id".to_string(), json!(id));
            }
            Ok(ApiResponse { body })
        })
    }

    /// Mock rejecting every call with the given raw payload
    pub fn rejecting(payload: Value, status_code: Option<u16>) -> Self {
        Self::new(move |_operation, _payload| {
            Err(ApiError {
                status_code,
                payload: payload.to_string(),
            })
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Operation names in the order calls arrived
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn respond(&self, operation: &str, payload: Value) -> ApiResult {
        self.calls.lock().unwrap().push(operation.to_string());
        (self.responder)(operation, payload)
    }
}

#[async_trait]
impl IntercomApi for MockApi {
    async fn create_user(&self, user: &UserRecord) -> ApiResult {
        self.respond("create_user", serde_json::to_value(user).unwrap())
    }

    async fn create_company(&self, company: &CompanyRecord) -> ApiResult {
        self.respond("create_company", serde_json::to_value(company).unwrap())
    }

    async fn delete_user(&self, params: &DeleteUser) -> ApiResult {
        self.respond("delete_user", serde_json::to_value(params).unwrap())
    }

    async fn tag(&self, request: &TagRequest) -> ApiResult {
        self.respond("tag", serde_json::to_value(request).unwrap())
    }
}

/// Rejection payload in the shape the legacy client stack produced: the
/// response wrapped under a top-level `message` key
pub fn wrapped_error_payload(code: &str, message: &str, status_code: u16) -> Value {
    json!({
        "message": {
            "statusCode": status_code,
            "body": {
                "errors": [{ "code": code, "message": message }]
            }
        }
    })
}

/// Random user record with a test-domain email
pub fn random_user() -> UserRecord {
    let mut rng = rand::thread_rng();
    let suffix: String = (&mut rng)
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();

    let mut user = UserRecord::new(rng.gen_range(100_000_000u64..1_000_000_000).to_string());
    user.email = Some(format!("{}@intercomtest.life", suffix));
    user.name = Some(format!("Test User {}", suffix));
    user
}

/// `amount` random user records
pub fn random_users(amount: usize) -> Vec<UserRecord> {
    (0..amount).map(|_| random_user()).collect()
}
