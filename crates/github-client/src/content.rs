//! Base64 helpers for the repository contents API.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tracing::warn;

/// Decode a `{"encoding": "base64", "content": "..."}` payload in place.
///
/// On success `content` becomes plain UTF-8 text and `encoding` becomes `"utf-8"`. Undecodable
/// content (bad base64, binary data) is left untouched with its original encoding tag.
///
/// Returns `true` if the payload was rewritten.
pub fn decode_base64_content(payload: &mut Value) -> bool {
    let Some(obj) = payload.as_object_mut() else {
        return false;
    };
    if obj.get("encoding").and_then(Value::as_str) != Some("base64") {
        return false;
    }
    let Some(encoded) = obj.get("content").and_then(Value::as_str) else {
        return false;
    };

    match decode_text(encoded) {
        Ok(text) => {
            obj.insert("content".to_string(), Value::String(text));
            obj.insert("encoding".to_string(), Value::String("utf-8".to_string()));
            true
        }
        Err(e) => {
            let path = obj.get("path").and_then(Value::as_str).unwrap_or_default();
            warn!(path, error = %e, "failed to decode base64 content; returning it encoded");
            false
        }
    }
}

/// Encode text for a contents API write.
#[must_use]
pub fn encode_text(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

fn decode_text(encoded: &str) -> Result<String, String> {
    // GitHub wraps base64 bodies at 60 columns.
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact).map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| e.to_string())
}
