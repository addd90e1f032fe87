//! Messages-API request types and the claim prompt builders.

use serde::{Deserialize, Serialize};

/// Schema tag expected by Bedrock messages-style models.
pub const MESSAGES_SCHEMA_VERSION: &str = "messages-v1";

/// One text content block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Block text.
    pub text: String,
}

/// A role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Speaker role, `user` for every prompt built here.
    pub role: String,
    /// Content blocks in order.
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// A user message with a single text block.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: vec![ContentBlock { text: text.into() }],
        }
    }
}

/// Sampling parameters sent with a messages request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Top-k sampling cutoff.
    pub top_k: u32,
}

impl InferenceConfig {
    /// Parameters with the default top-k of 20.
    pub const fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
            top_k: 20,
        }
    }
}

/// Full request body for a messages-style invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesRequest {
    /// Always [`MESSAGES_SCHEMA_VERSION`].
    pub schema_version: String,
    /// Conversation turns.
    pub messages: Vec<Message>,
    /// Sampling parameters.
    pub inference_config: InferenceConfig,
}

impl MessagesRequest {
    /// Build a request body from messages and sampling parameters.
    pub fn new(messages: Vec<Message>, inference_config: InferenceConfig) -> Self {
        Self {
            schema_version: MESSAGES_SCHEMA_VERSION.into(),
            messages,
            inference_config,
        }
    }
}

/// Prompt asking the model for the claim fields as a JSON object.
pub fn build_extraction_prompt(claim_text: &str) -> Message {
    Message::user(format!(
        "Extract the following structured fields as JSON keys with concise values:\n\
         - claimant_name\n- incident_date\n- claim_type\n- policy_number\n- amount_requested\n\
         If unavailable, use null. Do not include extra keys.\n\n\
         Claim text:\n{claim_text}"
    ))
}

/// Prompt asking for an examiner-facing summary grounded in the policy context.
pub fn build_summary_prompt(claim_text: &str, policy_context: &str) -> Message {
    Message::user(format!(
        "Summarize this insurance claim in 5-7 sentences for a claims examiner. \
         Include key facts, estimated severity, and any policy constraints from the provided context.\
         \n\nPolicy context:\n{policy_context}\n\nClaim text:\n{claim_text}"
    ))
}
