//! Key metadata: base64 key bytes carried in a small JSON object.
//!
//! Two textual forms are accepted:
//!
//! ```text
//! {"key": "3q2+7w=="}     JSON object with a base64 `key` field
//! 3q2+7w==                bare base64
//! ```
//!
//! The JSON form is recognised when the trimmed text begins with `{`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;

use super::secure_buffer::SecureBuffer;
use crate::errors::{Result, VaultError};

/// Name of the field holding the base64 key bytes.
pub const KEY_FIELD: &str = "key";

/// Decode the `key` field of a metadata object into raw key bytes.
pub fn decode_key_field(metadata: &Value) -> Result<SecureBuffer> {
    let encoded = metadata
        .get(KEY_FIELD)
        .and_then(Value::as_str)
        .ok_or_else(|| VaultError::InvalidArgument("metadata missing base64 'key' field".into()))?;
    decode_base64(encoded)
}

/// Parse metadata text in either accepted form and return the key bytes.
pub fn parse_key_metadata(text: &str) -> Result<SecureBuffer> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(VaultError::InvalidArgument(
            "key metadata is empty; cannot derive key".into(),
        ));
    }

    if trimmed.starts_with('{') {
        let value: Value = serde_json::from_str(trimmed)
            .map_err(|e| VaultError::InvalidArgument(format!("invalid key metadata JSON: {e}")))?;
        if !value.is_object() {
            return Err(VaultError::InvalidArgument(
                "key metadata JSON must be an object".into(),
            ));
        }
        return decode_key_field(&value);
    }

    decode_base64(trimmed)
}

fn decode_base64(encoded: &str) -> Result<SecureBuffer> {
    BASE64
        .decode(encoded.trim())
        .map(SecureBuffer::new)
        .map_err(|e| VaultError::InvalidArgument(format!("key is not valid base64: {e}")))
}

/// Render key bytes as metadata JSON text (`{"key":"<base64>"}`).
pub fn encode_key_metadata(key: &[u8]) -> String {
    serde_json::json!({ KEY_FIELD: BASE64.encode(key) }).to_string()
}
