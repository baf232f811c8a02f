//! Error body message extraction

use serde_json::Value;

/// Extract a human-readable message from an upstream error body
///
/// Understands the common `{"error": {"message": ..., "type": ...}}` envelope
/// and falls back to the raw body text.
pub fn read_error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    let Some(error) = json.get("error") else {
        return body.to_string();
    };

    let message = error.get("message").and_then(|m| m.as_str()).unwrap_or("");
    if message.is_empty() {
        return body.to_string();
    }

    match error.get("type").and_then(|t| t.as_str()) {
        Some(error_type) if !error_type.is_empty() => {
            format!("{} (type: {})", message, error_type)
        }
        _ => message.to_string(),
    }
}
