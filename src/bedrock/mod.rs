//! Client abstractions for Amazon Bedrock.
//!
//! The pipeline and the Lambda handler depend on the [`ModelRuntime`] and [`BatchJobs`] traits
//! only. Production code injects the AWS SDK adapters from [`aws`]; tests inject in-memory fakes.

pub mod aws;
mod document;
mod messages;

pub use document::json_to_document;
pub use messages::MessagesInvoker;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by Bedrock clients.
#[derive(Debug, Error)]
pub enum BedrockError {
    /// The service rejected the call or could not be reached.
    #[error("Bedrock {operation} failed: {message}")]
    Request {
        /// SDK operation name.
        operation: &'static str,
        /// Rendered SDK error.
        message: String,
    },
    /// A streamed response failed part-way through.
    #[error("Bedrock response stream failed: {0}")]
    Stream(String),
    /// A request could not be built from the supplied values.
    #[error("Invalid Bedrock request: {0}")]
    InvalidRequest(String),
}

/// Status snapshot for an asynchronous invocation.
///
/// Timestamps are RFC 3339 strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsyncInvokeDetails {
    /// ARN of the invocation.
    pub invocation_arn: String,
    /// Model the invocation runs against.
    pub model_arn: String,
    /// `InProgress`, `Completed`, or `Failed`.
    pub status: String,
    /// Failure reason reported by the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
    /// S3 location the invocation writes its output to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_s3_uri: Option<String>,
    /// When the invocation was submitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_time: Option<String>,
    /// When the invocation was last updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_time: Option<String>,
    /// When the invocation finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

/// Parameters for a batch model invocation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJobRequest {
    /// IAM role Bedrock assumes to read input and write output.
    pub role_arn: String,
    /// Model used for every record.
    pub model_id: String,
    /// Job name.
    pub job_name: String,
    /// S3 location of the JSONL input.
    pub input_s3_uri: String,
    /// S3 location receiving the output.
    pub output_s3_uri: String,
}

/// Status snapshot for a batch model invocation job.
///
/// Timestamps are RFC 3339 strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchJobDetails {
    /// ARN of the job.
    pub job_arn: String,
    /// Model used by the job.
    pub model_id: String,
    /// Lifecycle status such as `Submitted`, `InProgress`, or `Completed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Status message reported by the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Name given at submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
    /// IAM role the job runs under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
    /// S3 location of the JSONL input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_s3_uri: Option<String>,
    /// S3 location receiving the output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_s3_uri: Option<String>,
    /// When the job was submitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_time: Option<String>,
    /// When the job was last updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_time: Option<String>,
    /// When the job finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

/// Runtime operations: synchronous, streaming, and asynchronous invocation.
#[async_trait]
pub trait ModelRuntime: Send + Sync {
    /// Invoke a model and return the raw response body.
    async fn invoke_model(&self, model_id: &str, body: &Value) -> Result<Vec<u8>, BedrockError>;

    /// Invoke a model with a streamed response, returning every chunk in arrival order.
    async fn invoke_model_stream(
        &self,
        model_id: &str,
        body: &Value,
    ) -> Result<Vec<Vec<u8>>, BedrockError>;

    /// Start an asynchronous invocation writing its output under `output_s3_uri`.
    async fn start_async_invoke(
        &self,
        model_id: &str,
        model_input: &Value,
        output_s3_uri: &str,
    ) -> Result<String, BedrockError>;

    /// Fetch the status of an asynchronous invocation.
    async fn get_async_invoke(
        &self,
        invocation_arn: &str,
    ) -> Result<AsyncInvokeDetails, BedrockError>;
}

/// Control-plane operations for batch invocation jobs.
#[async_trait]
pub trait BatchJobs: Send + Sync {
    /// Submit a batch job and return its ARN.
    async fn create_model_invocation_job(
        &self,
        request: BatchJobRequest,
    ) -> Result<String, BedrockError>;

    /// Fetch the status of a batch job.
    async fn get_model_invocation_job(&self, job_arn: &str)
    -> Result<BatchJobDetails, BedrockError>;
}
