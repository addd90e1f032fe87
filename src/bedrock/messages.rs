use std::sync::Arc;

use super::{BedrockError, ModelRuntime};
use crate::normalize::{ModelPayload, decode_payload};
use crate::prompts::{InferenceConfig, Message, MessagesRequest};

/// Sends messages-API requests through an injected [`ModelRuntime`].
#[derive(Clone)]
pub struct MessagesInvoker {
    runtime: Arc<dyn ModelRuntime>,
    default_model_id: String,
}

impl MessagesInvoker {
    /// Wrap a runtime client, using `default_model_id` when a call names no model.
    pub fn new(runtime: Arc<dyn ModelRuntime>, default_model_id: impl Into<String>) -> Self {
        Self {
            runtime,
            default_model_id: default_model_id.into(),
        }
    }

    /// Model used when a call does not override it.
    pub fn default_model_id(&self) -> &str {
        &self.default_model_id
    }

    /// Invoke a messages-style model and decode the response body.
    ///
    /// Bodies that are not JSON come back as [`ModelPayload::Raw`].
    pub async fn invoke_messages(
        &self,
        messages: Vec<Message>,
        inference: InferenceConfig,
        model_id: Option<&str>,
    ) -> Result<ModelPayload, BedrockError> {
        let model_id = model_id.unwrap_or(&self.default_model_id);
        let request = MessagesRequest::new(messages, inference);
        let body = serde_json::to_value(&request)
            .map_err(|error| BedrockError::InvalidRequest(error.to_string()))?;

        tracing::debug!(
            model = model_id,
            max_tokens = inference.max_tokens,
            temperature = inference.temperature,
            "Invoking messages model"
        );
        let bytes = self.runtime.invoke_model(model_id, &body).await?;
        let payload = decode_payload(&bytes);
        if payload.is_raw() {
            tracing::warn!(model = model_id, "Model returned a non-JSON body");
        }
        Ok(payload)
    }
}
