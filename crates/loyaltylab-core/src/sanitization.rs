//! Masking of credentials before request payloads reach the logs

use serde_json::{Map, Value as JsonValue};

/// Field names (lowercased, namespace prefix removed) whose values are masked
const SENSITIVE_FIELDS: &[&str] = &["password", "token", "passwd", "secret", "credential"];

const SENSITIVE_PATTERNS: &[&str] = &["_token", "_secret", "_password"];

/// Replacement text for masked values
pub const SANITIZED_PLACEHOLDER: &str = "***REDACTED***";

/// Check if a field name indicates sensitive data.
///
/// Wire keys such as `wsdl:Password` are checked by their local name.
pub fn is_sensitive_field(field_name: &str) -> bool {
    let local = field_name.rsplit(':').next().unwrap_or(field_name);
    let field_lower = local.to_lowercase();

    if SENSITIVE_FIELDS.iter().any(|&sensitive| field_lower == sensitive) {
        return true;
    }

    SENSITIVE_PATTERNS
        .iter()
        .any(|&pattern| field_lower.contains(pattern))
}

/// Sanitize a JSON value by replacing sensitive fields with placeholders
pub fn sanitize_json_value(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            let sanitized: Map<String, JsonValue> = map
                .iter()
                .map(|(key, val)| {
                    let sanitized_val = match val {
                        JsonValue::String(_) | JsonValue::Number(_) | JsonValue::Bool(_)
                            if is_sensitive_field(key) =>
                        {
                            JsonValue::String(SANITIZED_PLACEHOLDER.to_string())
                        }
                        other => sanitize_json_value(other),
                    };
                    (key.clone(), sanitized_val)
                })
                .collect();
            JsonValue::Object(sanitized)
        }
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(sanitize_json_value).collect()),
        other => other.clone(),
    }
}

/// Create a sanitized display string for debugging
pub fn create_debug_string(prefix: &str, json: &JsonValue) -> String {
    format!("{}: {}", prefix, sanitize_json_value(json))
}
