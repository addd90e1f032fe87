//! Decoding of raw model response bodies.

use serde_json::{Value, json};

/// A model response body after a best-effort JSON decode.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelPayload {
    /// The body parsed as JSON.
    Json(Value),
    /// The body was not JSON; holds the lossily decoded text.
    Raw(String),
}

impl ModelPayload {
    /// JSON view of the payload; raw text is wrapped as `{"raw": text}`.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Json(value) => value.clone(),
            Self::Raw(text) => json!({ "raw": text }),
        }
    }

    /// Whether the body had to be kept as raw text.
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

/// Decode a response body, falling back to raw UTF-8 text when it is not JSON.
pub fn decode_payload(bytes: &[u8]) -> ModelPayload {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => ModelPayload::Json(value),
        Err(error) => {
            tracing::debug!(%error, len = bytes.len(), "Model payload is not JSON; keeping raw text");
            ModelPayload::Raw(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
