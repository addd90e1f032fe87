//! Recovery of usable text and JSON from heterogeneous model responses.
//!
//! Responses arrive as plain JSON, wrapped JSON, streamed chunks, or raw bytes. Nothing here
//! fails: every path degrades to a less structured representation, and the degradation is
//! reported through [`TextOutcome`] and [`JsonExtraction`] rather than swallowed.

mod embedded;
mod payload;
pub mod strategy;
mod stream;

pub use embedded::{JsonExtraction, extract_json_object};
pub use payload::{ModelPayload, decode_payload};
pub use stream::{StreamAccumulator, StreamSummary};
pub use strategy::{DEFAULT_STRATEGIES, TextStrategy};

use serde_json::Value;

/// Result of turning a response into text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextOutcome {
    /// A known text-bearing shape matched.
    Extracted {
        /// Recovered text.
        text: String,
        /// Name of the strategy that matched.
        strategy: &'static str,
    },
    /// No shape matched; the whole JSON value was serialized.
    Serialized(String),
    /// The payload was not JSON; holds the decoded text.
    Raw(String),
    /// The response body was zero-length.
    Empty,
}

impl TextOutcome {
    /// Borrow the text, empty for [`TextOutcome::Empty`].
    pub fn text(&self) -> &str {
        match self {
            Self::Extracted { text, .. } | Self::Serialized(text) | Self::Raw(text) => text,
            Self::Empty => "",
        }
    }

    /// Consume the outcome and return its text, empty for [`TextOutcome::Empty`].
    pub fn into_text(self) -> String {
        match self {
            Self::Extracted { text, .. } | Self::Serialized(text) | Self::Raw(text) => text,
            Self::Empty => String::new(),
        }
    }

    /// Whether the text came from a fallback rather than a recognized shape.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::Extracted { .. })
    }

    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Extracted { .. } => "extracted",
            Self::Serialized(_) => "serialized",
            Self::Raw(_) => "raw",
            Self::Empty => "empty",
        }
    }
}

/// Extract text from a JSON value with the default strategies.
pub fn normalize_value(value: &Value) -> TextOutcome {
    normalize_value_with(DEFAULT_STRATEGIES, value)
}

/// Extract text from a JSON value with a caller-supplied strategy list.
pub fn normalize_value_with(strategies: &[&dyn TextStrategy], value: &Value) -> TextOutcome {
    match strategy::first_match(strategies, value) {
        Some((strategy, text)) => TextOutcome::Extracted { text, strategy },
        None => TextOutcome::Serialized(value.to_string()),
    }
}

/// Extract text from a decoded model payload.
pub fn normalize_payload(payload: &ModelPayload) -> TextOutcome {
    match payload {
        ModelPayload::Json(value) => normalize_value(value),
        ModelPayload::Raw(text) if text.is_empty() => TextOutcome::Empty,
        ModelPayload::Raw(text) => TextOutcome::Raw(text.clone()),
    }
}

/// Decode raw response bytes and extract text in one step.
pub fn normalize_bytes(bytes: &[u8]) -> TextOutcome {
    normalize_payload(&decode_payload(bytes))
}
