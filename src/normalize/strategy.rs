//! Ordered text-extraction strategies for loosely structured model responses.
//!
//! Each strategy recognizes one response shape. [`DEFAULT_STRATEGIES`] lists them in priority
//! order; the first strategy that yields non-empty text wins.

use serde_json::Value;

/// Capability to pull text out of one particular response shape.
pub trait TextStrategy: Send + Sync {
    /// Short label recorded when this strategy produced the text.
    fn name(&self) -> &'static str;

    /// Extract non-empty text, or `None` when the shape does not match.
    fn extract(&self, value: &Value) -> Option<String>;
}

/// A top-level key holding either a string or a list of content parts.
///
/// Parts contribute their `text` (or `raw`) field, or themselves when they are bare strings.
/// Contributions are joined with newlines.
#[derive(Debug, Clone, Copy)]
pub struct ContentParts(pub &'static str);

impl TextStrategy for ContentParts {
    fn name(&self) -> &'static str {
        self.0
    }

    fn extract(&self, value: &Value) -> Option<String> {
        match value.get(self.0)? {
            Value::String(text) if !text.is_empty() => Some(text.clone()),
            Value::Array(parts) => join_part_texts(parts),
            _ => None,
        }
    }
}

/// The Bedrock messages envelope: `output.message.content[*].text`.
#[derive(Debug, Clone, Copy)]
pub struct MessageEnvelope;

impl TextStrategy for MessageEnvelope {
    fn name(&self) -> &'static str {
        "output.message.content"
    }

    fn extract(&self, value: &Value) -> Option<String> {
        let parts = value
            .pointer("/output/message/content")
            .and_then(Value::as_array)?;
        join_part_texts(parts)
    }
}

/// Strategies in priority order.
pub static DEFAULT_STRATEGIES: &[&dyn TextStrategy] = &[
    &ContentParts("outputText"),
    &ContentParts("text"),
    &ContentParts("content"),
    &ContentParts("raw"),
    &MessageEnvelope,
];

/// Run strategies in order and return the first hit with the strategy name.
pub fn first_match(
    strategies: &[&dyn TextStrategy],
    value: &Value,
) -> Option<(&'static str, String)> {
    strategies
        .iter()
        .find_map(|strategy| strategy.extract(value).map(|text| (strategy.name(), text)))
}

fn join_part_texts(parts: &[Value]) -> Option<String> {
    let texts: Vec<&str> = parts
        .iter()
        .filter_map(|part| match part {
            Value::String(text) => Some(text.as_str()),
            Value::Object(_) => ["text", "raw"]
                .iter()
                .find_map(|key| part.get(*key).and_then(Value::as_str).filter(|t| !t.is_empty())),
            _ => None,
        })
        .filter(|text| !text.is_empty())
        .collect();
    if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n"))
    }
}
