//! Recovery of a JSON object from model text output.

use serde_json::{Map, Value};

/// Outcome of looking for a JSON object inside model output.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonExtraction {
    /// The whole text was a JSON object.
    Parsed(Map<String, Value>),
    /// An object was found between the first `{` and the last `}`.
    Embedded(Map<String, Value>),
    /// No object could be recovered.
    Missing,
}

impl JsonExtraction {
    /// The recovered object, or an empty map when nothing was found.
    pub fn into_map(self) -> Map<String, Value> {
        match self {
            Self::Parsed(map) | Self::Embedded(map) => map,
            Self::Missing => Map::new(),
        }
    }

    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parsed(_) => "parsed",
            Self::Embedded(_) => "embedded",
            Self::Missing => "missing",
        }
    }
}

/// Locate a JSON object in model output.
///
/// Prose around the object (code fences, preambles) is tolerated by slicing from the first `{`
/// to the last `}`. Text holding several objects, or braces inside surrounding prose, defeats the
/// slice and yields [`JsonExtraction::Missing`].
pub fn extract_json_object(text: &str) -> JsonExtraction {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text.trim()) {
        return JsonExtraction::Parsed(map);
    }

    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return JsonExtraction::Missing;
    };
    if end < start {
        return JsonExtraction::Missing;
    }

    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(map)) => JsonExtraction::Embedded(map),
        _ => JsonExtraction::Missing,
    }
}
