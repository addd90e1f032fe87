//! Accumulation of streamed response chunks into a single string.

use serde_json::Value;

use super::strategy::{ContentParts, TextStrategy, first_match};

/// Pointer to the text delta carried by Bedrock `contentBlockDelta` stream events.
const DELTA_POINTER: &str = "/contentBlockDelta/delta/text";

static CHUNK_STRATEGIES: &[&dyn TextStrategy] =
    &[&ContentParts("outputText"), &ContentParts("text")];

/// Counters describing how streamed chunks were interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// Chunks whose text came from a recognized JSON field.
    pub parsed_chunks: usize,
    /// Chunks appended verbatim because no text field was found.
    pub raw_chunks: usize,
    /// Chunks that were empty and contributed nothing.
    pub empty_chunks: usize,
}

/// Concatenates streamed chunks in arrival order.
///
/// Each chunk is decoded as UTF-8 (invalid sequences are replaced). A JSON object chunk
/// contributes its `outputText`, `text`, or `contentBlockDelta.delta.text` field when non-empty;
/// any other chunk is appended as its decoded text.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    text: String,
    summary: StreamSummary,
}

impl StreamAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one chunk.
    pub fn push_chunk(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            self.summary.empty_chunks += 1;
            return;
        }

        let decoded = String::from_utf8_lossy(bytes);
        match serde_json::from_str::<Value>(&decoded)
            .ok()
            .and_then(|value| chunk_text(&value))
        {
            Some(text) => {
                self.summary.parsed_chunks += 1;
                self.text.push_str(&text);
            }
            None => {
                self.summary.raw_chunks += 1;
                self.text.push_str(&decoded);
            }
        }
    }

    /// Accumulated text so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Interpretation counters so far.
    pub fn summary(&self) -> StreamSummary {
        self.summary
    }

    /// Consume the accumulator, returning the text and counters.
    pub fn finish(self) -> (String, StreamSummary) {
        (self.text, self.summary)
    }
}

impl<B: AsRef<[u8]>> FromIterator<B> for StreamAccumulator {
    fn from_iter<I: IntoIterator<Item = B>>(iter: I) -> Self {
        let mut accumulator = Self::new();
        for chunk in iter {
            accumulator.push_chunk(chunk.as_ref());
        }
        accumulator
    }
}

fn chunk_text(value: &Value) -> Option<String> {
    if !value.is_object() {
        return None;
    }
    first_match(CHUNK_STRATEGIES, value)
        .map(|(_, text)| text)
        .or_else(|| {
            value
                .pointer(DELTA_POINTER)
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenates_text_fields_in_order() {
        let accumulator: StreamAccumulator = [
            br#"{"outputText":"Hel"}"#.as_slice(),
            br#"{"text":"lo"}"#.as_slice(),
            br#"{"contentBlockDelta":{"delta":{"text":"!"},"contentBlockIndex":0}}"#.as_slice(),
        ]
        .into_iter()
        .collect();
        let (text, summary) = accumulator.finish();
        assert_eq!(text, "Hello!");
        assert_eq!(summary.parsed_chunks, 3);
    }

    #[test]
    fn malformed_chunks_are_appended_raw() {
        let mut accumulator = StreamAccumulator::new();
        accumulator.push_chunk(br#"{"outputText":"a"}"#);
        accumulator.push_chunk(b"{not json");
        accumulator.push_chunk(br#"{"outputText":""}"#);
        accumulator.push_chunk(b"");
        assert_eq!(accumulator.text(), r#"a{not json{"outputText":""}"#);
        assert_eq!(
            accumulator.summary(),
            StreamSummary {
                parsed_chunks: 1,
                raw_chunks: 2,
                empty_chunks: 1,
            }
        );
    }

    #[test]
    fn invalid_utf8_is_kept_lossily() {
        let mut accumulator = StreamAccumulator::new();
        accumulator.push_chunk(&[b'h', b'i', 0xfe]);
        assert!(accumulator.text().starts_with("hi"));
        assert_eq!(accumulator.summary().raw_chunks, 1);
    }

    #[test]
    fn json_scalars_are_appended_as_text() {
        let accumulator: StreamAccumulator = [b"42".as_slice(), b"\"x\"".as_slice()]
            .into_iter()
            .collect();
        assert_eq!(accumulator.text(), "42\"x\"");
    }
}
