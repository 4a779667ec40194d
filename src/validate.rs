//! Custom-attribute validation
//!
//! Checks record attributes against the platform limits before any remote
//! call is made, so malformed records are rejected locally.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Maximum number of custom attributes per record
pub const MAX_CUSTOM_ATTRIBUTES: usize = 100;
/// Maximum length of an attribute key, in characters
pub const MAX_KEY_LENGTH: usize = 190;
/// Maximum length of a string attribute value, in characters
pub const MAX_STRING_VALUE_LENGTH: usize = 255;

/// Validation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True when no violations were found
    pub validated: bool,
    /// One human-readable message per violation
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Result with no violations
    pub fn success() -> Self {
        Self {
            validated: true,
            errors: Vec::new(),
        }
    }

    /// Record a violation
    pub fn add_error(&mut self, message: String) {
        self.validated = false;
        self.errors.push(message);
    }
}

/// Validate a record's custom attributes against the platform limits
///
/// Violations accumulate; every failing key is reported. The one exception
/// is the map size: when the map exceeds [`MAX_CUSTOM_ATTRIBUTES`], only the
/// size violation is reported and per-key checks are skipped.
pub fn validate_custom_attributes(attributes: &Map<String, Value>) -> ValidationResult {
    let mut result = ValidationResult::success();

    if attributes.len() > MAX_CUSTOM_ATTRIBUTES {
        result.add_error(format!(
            "custom_attributes holds {} entries, more than the allowed {}",
            attributes.len(),
            MAX_CUSTOM_ATTRIBUTES
        ));
        return result;
    }

    for (key, value) in attributes {
        let key_length = key.chars().count();
        if key_length > MAX_KEY_LENGTH {
            result.add_error(format!(
                "key '{}' is {} characters long, more than the allowed {}",
                key, key_length, MAX_KEY_LENGTH
            ));
        }

        if key.contains('.') || key.contains('$') {
            result.add_error(format!(
                "key '{}' contains a disallowed character ('.' or '$')",
                key
            ));
        }

        match value {
            Value::String(text) => {
                let value_length = text.chars().count();
                if value_length > MAX_STRING_VALUE_LENGTH {
                    result.add_error(format!(
                        "value of key '{}' is {} characters long, more than the allowed {}",
                        key, value_length, MAX_STRING_VALUE_LENGTH
                    ));
                }
            }
            Value::Number(_) | Value::Bool(_) => {}
            _ => {
                result.add_error(format!(
                    "value of key '{}' must be a string, number or boolean",
                    key
                ));
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attributes(pairs: Vec<(&str, Value)>) -> Map<String, Value> {
        pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }

    #[test]
    fn test_valid_attributes_pass() {
        let attrs = attributes(vec![
            ("plan", json!("pro")),
            ("seats", json!(12)),
            ("active", json!(true)),
        ]);
        let result = validate_custom_attributes(&attrs);
        assert!(result.validated);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_empty_map_passes() {
        let result = validate_custom_attributes(&Map::new());
        assert!(result.validated);
    }

    #[test]
    fn test_oversized_map_reports_single_error() {
        let attrs: Map<String, Value> = (0..MAX_CUSTOM_ATTRIBUTES + 1)
            .map(|i| (format!("bad.key_{}", i), json!("v")))
            .collect();
        let result = validate_custom_attributes(&attrs);
        assert!(!result.validated);
        // Per-key checks are skipped, even though every key is malformed.
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("101 entries"));
    }

    #[test]
    fn test_map_at_limit_is_checked_per_key() {
        let attrs: Map<String, Value> = (0..MAX_CUSTOM_ATTRIBUTES)
            .map(|i| (format!("key_{}", i), json!("v")))
            .collect();
        let result = validate_custom_attributes(&attrs);
        assert!(result.validated);
    }

    #[test]
    fn test_key_with_dot_or_dollar_is_rejected() {
        let attrs = attributes(vec![("billing.plan", json!("pro")), ("co$t", json!(1))]);
        let result = validate_custom_attributes(&attrs);
        assert!(!result.validated);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_long_key_is_rejected() {
        let key = "k".repeat(MAX_KEY_LENGTH + 1);
        let attrs = attributes(vec![(key.as_str(), json!("v"))]);
        let result = validate_custom_attributes(&attrs);
        assert!(!result.validated);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("191 characters"));
    }

    #[test]
    fn test_key_at_limit_passes() {
        let key = "k".repeat(MAX_KEY_LENGTH);
        let attrs = attributes(vec![(key.as_str(), json!("v"))]);
        assert!(validate_custom_attributes(&attrs).validated);
    }

    #[test]
    fn test_long_string_value_is_rejected() {
        let attrs = attributes(vec![("note", json!("x".repeat(MAX_STRING_VALUE_LENGTH + 1)))]);
        let result = validate_custom_attributes(&attrs);
        assert!(!result.validated);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("256 characters"));
    }

    #[test]
    fn test_composite_values_are_rejected() {
        let attrs = attributes(vec![
            ("tags", json!(["a", "b"])),
            ("nested", json!({"a": 1})),
            ("missing", Value::Null),
        ]);
        let result = validate_custom_attributes(&attrs);
        assert!(!result.validated);
        assert_eq!(result.errors.len(), 3);
    }

    #[test]
    fn test_violations_accumulate_across_keys() {
        let long_key = "k".repeat(MAX_KEY_LENGTH + 1);
        let attrs = attributes(vec![
            (long_key.as_str(), json!("v")),
            ("price.total", json!("x".repeat(MAX_STRING_VALUE_LENGTH + 1))),
        ]);
        let result = validate_custom_attributes(&attrs);
        assert!(!result.validated);
        // Long key, dotted key, and oversized value are all reported.
        assert_eq!(result.errors.len(), 3);
    }
}
