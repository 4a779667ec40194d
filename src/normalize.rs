//! Normalization of remote error shapes
//!
//! The platform rejects requests in several shapes: a structured body with
//! an `errors` list, the same body wrapped under a top-level `message` key,
//! or plain text when a proxy answered instead. All of them fold into the
//! one [`Failure`] shape callers see.

use crate::client::ApiError;
use crate::types::{Failure, CODE_UNKNOWN_ERROR};
use serde_json::Value;

/// Normalize a remote rejection into a typed [`Failure`]
///
/// `fallback_message` is used when the payload carries no usable error
/// entry; callers phrase it per operation so the affected record stays
/// identifiable. The raw payload is always preserved in `original_error`.
pub fn normalize_api_error(
    error: &ApiError,
    fallback_message: &str,
    internal_id: Option<&str>,
) -> Failure {
    let parsed: Option<Value> = serde_json::from_str(&error.payload).ok();

    // Some client stacks wrap the response under a top-level `message` key.
    let body_owner = parsed
        .as_ref()
        .map(|value| value.get("message").unwrap_or(value));

    let first_error = body_owner
        .and_then(|value| value.get("body"))
        .and_then(|body| body.get("errors"))
        .and_then(Value::as_array)
        .and_then(|errors| errors.first());

    let status_code = body_owner
        .and_then(|value| value.get("statusCode"))
        .and_then(Value::as_u64)
        .map(|code| code as u16)
        .or(error.status_code);

    let code = first_error
        .and_then(|entry| entry.get("code"))
        .and_then(Value::as_str)
        .unwrap_or(CODE_UNKNOWN_ERROR)
        .to_string();

    let message = first_error
        .and_then(|entry| entry.get("message"))
        .and_then(Value::as_str)
        .unwrap_or(fallback_message)
        .to_string();

    Failure {
        code,
        message: message.clone(),
        errors: vec![message],
        internal_id: internal_id.map(str::to_string),
        status_code,
        original_error: Some(error.payload.clone()),
    }
}
