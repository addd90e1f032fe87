//! Lambda event routing for Bedrock video, text, streaming, and job-status actions.
//!
//! The event's `action` field picks one of six operations; an absent or unknown action falls
//! back to video generation. Missing required parameters produce a `400` response body rather
//! than an error, while client failures propagate to the Lambda runtime.

use rand::Rng;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;

use crate::bedrock::{BatchJobRequest, BatchJobs, BedrockError, ModelRuntime};
use crate::config::Config;
use crate::normalize::{StreamAccumulator, decode_payload};
use crate::prompts::{InferenceConfig, Message, MessagesRequest};

/// Prompt used by `video_generate` when the event carries none.
pub const DEFAULT_VIDEO_PROMPT: &str = "A person dancing on a mountain.";
/// Prompt used by `text_generate` when the event carries none.
pub const DEFAULT_TEXT_PROMPT: &str =
    "Rewrite this sentence in a formal tone: You are very good at your job.";
/// Prompt used by `text_stream` when the event carries none.
pub const DEFAULT_STREAM_PROMPT: &str = "Tell me what type of dances people do.";
/// Job name used by `batch_submit` when the event carries none.
pub const DEFAULT_JOB_NAME: &str = "bedrock-batch-job";
/// Largest seed accepted by the video model.
pub const MAX_VIDEO_SEED: u32 = 2_147_483_646;

const TEXT_INFERENCE: InferenceConfig = InferenceConfig {
    max_tokens: 500,
    temperature: 0.7,
    top_k: 20,
};

/// Errors propagated to the Lambda runtime.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The event payload had fields of the wrong type.
    #[error("invalid event: {0}")]
    InvalidEvent(#[source] serde_json::Error),
    /// A Bedrock call failed.
    #[error(transparent)]
    Bedrock(#[from] BedrockError),
    /// A response could not be encoded.
    #[error("failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Operation selected by the event's `action` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// Start an asynchronous text-to-video job.
    #[default]
    VideoGenerate,
    /// Single messages-API text generation.
    TextGenerate,
    /// Streamed text generation accumulated into one string.
    TextStream,
    /// Status of an asynchronous invocation.
    AsyncStatus,
    /// Submit a batch invocation job.
    BatchSubmit,
    /// Status of a batch invocation job.
    BatchStatus,
}

impl Action {
    /// Resolve an action name; absent or unrecognized names select video generation.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("text_generate") => Self::TextGenerate,
            Some("text_stream") => Self::TextStream,
            Some("async_status") => Self::AsyncStatus,
            Some("batch_submit") => Self::BatchSubmit,
            Some("batch_status") => Self::BatchStatus,
            _ => Self::VideoGenerate,
        }
    }

    /// Wire name echoed in responses.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VideoGenerate => "video_generate",
            Self::TextGenerate => "text_generate",
            Self::TextStream => "text_stream",
            Self::AsyncStatus => "async_status",
            Self::BatchSubmit => "batch_submit",
            Self::BatchStatus => "batch_status",
        }
    }
}

/// Fields the handler reads from an incoming event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerEvent {
    /// Action name.
    #[serde(default)]
    pub action: Option<String>,
    /// Prompt for generation actions.
    #[serde(default)]
    pub prompt: Option<String>,
    /// Invocation to query for `async_status`.
    #[serde(default)]
    pub invocation_arn: Option<String>,
    /// IAM role for `batch_submit`.
    #[serde(default)]
    pub role_arn: Option<String>,
    /// Batch input location.
    #[serde(default, rename = "inputS3Uri")]
    pub input_s3_uri: Option<String>,
    /// Batch output location.
    #[serde(default, rename = "outputS3Uri")]
    pub output_s3_uri: Option<String>,
    /// Model override for `batch_submit`.
    #[serde(default)]
    pub model_id: Option<String>,
    /// Job name for `batch_submit`.
    #[serde(default)]
    pub job_name: Option<String>,
    /// Job to query for `batch_status`.
    #[serde(default)]
    pub job_arn: Option<String>,
}

impl HandlerEvent {
    /// Parse a raw event; `null` is treated as an empty event.
    pub fn from_value(value: Value) -> Result<Self, HandlerError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(HandlerError::InvalidEvent)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}

fn bad_request(message: &str) -> Value {
    json!({ "statusCode": 400, "error": message })
}

/// Uniform seed in `0..=MAX_VIDEO_SEED`.
pub fn random_seed() -> u32 {
    rand::rng().random_range(0..=MAX_VIDEO_SEED)
}

/// Routes Lambda events to Bedrock through injected clients.
pub struct BedrockHandler {
    runtime: Arc<dyn ModelRuntime>,
    jobs: Arc<dyn BatchJobs>,
    config: Config,
    seed_source: fn() -> u32,
}

impl BedrockHandler {
    /// Build a handler using random video seeds.
    pub fn new(runtime: Arc<dyn ModelRuntime>, jobs: Arc<dyn BatchJobs>, config: Config) -> Self {
        Self {
            runtime,
            jobs,
            config,
            seed_source: random_seed,
        }
    }

    /// Replace the video seed generator.
    pub fn with_seed_source(mut self, seed_source: fn() -> u32) -> Self {
        self.seed_source = seed_source;
        self
    }

    /// Handle one raw Lambda event.
    pub async fn handle(&self, event: Value) -> Result<Value, HandlerError> {
        let event = HandlerEvent::from_value(event)?;
        let action = Action::from_name(event.action.as_deref());
        tracing::info!(action = action.as_str(), "Handling event");

        match action {
            Action::VideoGenerate => self.video_generate(&event).await,
            Action::TextGenerate => self.text_generate(&event).await,
            Action::TextStream => self.text_stream(&event).await,
            Action::AsyncStatus => self.async_status(&event).await,
            Action::BatchSubmit => self.batch_submit(&event).await,
            Action::BatchStatus => self.batch_status(&event).await,
        }
    }

    async fn video_generate(&self, event: &HandlerEvent) -> Result<Value, HandlerError> {
        let prompt = event.prompt.as_deref().unwrap_or(DEFAULT_VIDEO_PROMPT);
        let seed = (self.seed_source)();
        let model_input = json!({
            "taskType": "TEXT_VIDEO",
            "textToVideoParams": { "text": prompt },
            "videoGenerationConfig": {
                "fps": 24,
                "durationSeconds": 6,
                "dimension": "1280x720",
                "seed": seed,
            },
        });

        let invocation_arn = self
            .runtime
            .start_async_invoke(
                &self.config.video_model_id,
                &model_input,
                &self.config.video_output_uri(),
            )
            .await?;
        tracing::info!(%invocation_arn, seed, "Started video generation");

        Ok(json!({
            "statusCode": 200,
            "action": Action::VideoGenerate.as_str(),
            "invocationArn": invocation_arn,
        }))
    }

    async fn text_generate(&self, event: &HandlerEvent) -> Result<Value, HandlerError> {
        let prompt = event.prompt.as_deref().unwrap_or(DEFAULT_TEXT_PROMPT);
        let model_id = &self.config.text_model_id;
        let request = MessagesRequest::new(vec![Message::user(prompt)], TEXT_INFERENCE);
        let body = serde_json::to_value(&request).map_err(HandlerError::Encode)?;

        let bytes = self.runtime.invoke_model(model_id, &body).await?;
        let payload = decode_payload(&bytes);
        if payload.is_raw() {
            tracing::warn!(model = %model_id, "Text generation returned a non-JSON body");
        }

        Ok(json!({
            "statusCode": 200,
            "action": Action::TextGenerate.as_str(),
            "modelId": model_id,
            "body": payload.to_value(),
        }))
    }

    async fn text_stream(&self, event: &HandlerEvent) -> Result<Value, HandlerError> {
        let prompt = event.prompt.as_deref().unwrap_or(DEFAULT_STREAM_PROMPT);
        let model_id = &self.config.text_model_id;
        let body = json!({ "messages": [Message::user(prompt)] });

        let chunks = self.runtime.invoke_model_stream(model_id, &body).await?;
        let (text, summary) = chunks.iter().collect::<StreamAccumulator>().finish();
        tracing::info!(
            model = %model_id,
            parsed = summary.parsed_chunks,
            raw = summary.raw_chunks,
            empty = summary.empty_chunks,
            "Accumulated streamed response"
        );

        Ok(json!({
            "statusCode": 200,
            "action": Action::TextStream.as_str(),
            "modelId": model_id,
            "body": text,
        }))
    }

    async fn async_status(&self, event: &HandlerEvent) -> Result<Value, HandlerError> {
        let Some(invocation_arn) = present(&event.invocation_arn) else {
            return Ok(bad_request("invocationArn is required"));
        };

        let details = self.runtime.get_async_invoke(invocation_arn).await?;
        Ok(json!({
            "statusCode": 200,
            "action": Action::AsyncStatus.as_str(),
            "invocationArn": invocation_arn,
            "status": details.status,
            "details": serde_json::to_value(&details).map_err(HandlerError::Encode)?,
        }))
    }

    async fn batch_submit(&self, event: &HandlerEvent) -> Result<Value, HandlerError> {
        let (Some(role_arn), Some(input_s3_uri), Some(output_s3_uri)) = (
            present(&event.role_arn),
            present(&event.input_s3_uri),
            present(&event.output_s3_uri),
        ) else {
            return Ok(bad_request(
                "roleArn, inputS3Uri, and outputS3Uri are required",
            ));
        };

        let model_id = present(&event.model_id)
            .unwrap_or(&self.config.text_model_id)
            .to_string();
        let request = BatchJobRequest {
            role_arn: role_arn.to_string(),
            model_id: model_id.clone(),
            job_name: present(&event.job_name)
                .unwrap_or(DEFAULT_JOB_NAME)
                .to_string(),
            input_s3_uri: input_s3_uri.to_string(),
            output_s3_uri: output_s3_uri.to_string(),
        };

        let job_arn = self.jobs.create_model_invocation_job(request).await?;
        tracing::info!(%job_arn, model = %model_id, "Submitted batch job");
        Ok(json!({
            "statusCode": 200,
            "action": Action::BatchSubmit.as_str(),
            "jobArn": job_arn,
            "modelId": model_id,
        }))
    }

    async fn batch_status(&self, event: &HandlerEvent) -> Result<Value, HandlerError> {
        let Some(job_arn) = present(&event.job_arn) else {
            return Ok(bad_request("jobArn is required"));
        };

        let details = self.jobs.get_model_invocation_job(job_arn).await?;
        Ok(json!({
            "statusCode": 200,
            "action": Action::BatchStatus.as_str(),
            "jobArn": job_arn,
            "status": details.status,
            "details": serde_json::to_value(&details).map_err(HandlerError::Encode)?,
        }))
    }
}
