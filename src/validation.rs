//! Normalization of model-extracted claim fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys every validated extraction carries, in output order.
pub const REQUIRED_KEYS: [&str; 5] = [
    "claimant_name",
    "incident_date",
    "claim_type",
    "policy_number",
    "amount_requested",
];

/// Maximum number of characters kept for any field value.
pub const MAX_FIELD_CHARS: usize = 500;

/// Structured claim fields after validation.
///
/// Every field is present; values are `None` when the model did not supply them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedClaim {
    /// Name of the person filing the claim.
    pub claimant_name: Option<String>,
    /// Date of the incident as written by the model.
    pub incident_date: Option<String>,
    /// Category of the claim (flood, fire, auto, ...).
    pub claim_type: Option<String>,
    /// Policy identifier referenced by the claim.
    pub policy_number: Option<String>,
    /// Amount requested, kept as text.
    pub amount_requested: Option<String>,
}

impl ExtractedClaim {
    /// Field values paired with their keys, in [`REQUIRED_KEYS`] order.
    pub fn fields(&self) -> [(&'static str, Option<&str>); 5] {
        [
            (REQUIRED_KEYS[0], self.claimant_name.as_deref()),
            (REQUIRED_KEYS[1], self.incident_date.as_deref()),
            (REQUIRED_KEYS[2], self.claim_type.as_deref()),
            (REQUIRED_KEYS[3], self.policy_number.as_deref()),
            (REQUIRED_KEYS[4], self.amount_requested.as_deref()),
        ]
    }

    /// Number of fields the model left empty.
    pub fn missing_count(&self) -> usize {
        self.fields()
            .iter()
            .filter(|(_, value)| value.is_none())
            .count()
    }
}

/// Keep exactly the required keys, defaulting absent ones to `None` and capping long values.
///
/// Strings are cut to [`MAX_FIELD_CHARS`] characters. Numbers and booleans keep their JSON
/// spelling; arrays and objects are serialized and then capped. Keys outside
/// [`REQUIRED_KEYS`] are dropped.
pub fn validate_extraction(extracted: &Map<String, Value>) -> ExtractedClaim {
    let field = |key: &str| extracted.get(key).and_then(field_text);
    let claim = ExtractedClaim {
        claimant_name: field(REQUIRED_KEYS[0]),
        incident_date: field(REQUIRED_KEYS[1]),
        claim_type: field(REQUIRED_KEYS[2]),
        policy_number: field(REQUIRED_KEYS[3]),
        amount_requested: field(REQUIRED_KEYS[4]),
    };

    let dropped = extracted
        .keys()
        .filter(|key| !REQUIRED_KEYS.contains(&key.as_str()))
        .count();
    if dropped > 0 {
        tracing::debug!(dropped, "Dropped unexpected extraction keys");
    }

    claim
}

fn field_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    Some(truncate_chars(text, MAX_FIELD_CHARS))
}

fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text,
    }
}
