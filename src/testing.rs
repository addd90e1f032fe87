//! In-memory client fakes shared by unit tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use crate::bedrock::{
    AsyncInvokeDetails, BatchJobDetails, BatchJobRequest, BatchJobs, BedrockError, ModelRuntime,
};
use crate::handler::DEFAULT_JOB_NAME;
use crate::storage::{ObjectStore, StorageError, s3_uri};

/// A recorded runtime call: operation, model id, and request body.
pub(crate) type RuntimeCall = (&'static str, String, Value);

#[derive(Default)]
pub(crate) struct FakeRuntime {
    pub(crate) responses: Mutex<VecDeque<Vec<u8>>>,
    pub(crate) stream_chunks: Vec<Vec<u8>>,
    pub(crate) calls: Mutex<Vec<RuntimeCall>>,
}

impl FakeRuntime {
    pub(crate) fn with_responses<I, B>(responses: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<RuntimeCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, operation: &'static str, model_id: &str, body: &Value) {
        self.calls
            .lock()
            .expect("calls lock")
            .push((operation, model_id.to_string(), body.clone()));
    }
}

#[async_trait]
impl ModelRuntime for FakeRuntime {
    async fn invoke_model(&self, model_id: &str, body: &Value) -> Result<Vec<u8>, BedrockError> {
        self.record("invoke_model", model_id, body);
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .ok_or_else(|| BedrockError::Request {
                operation: "InvokeModel",
                message: "no queued response".into(),
            })
    }

    async fn invoke_model_stream(
        &self,
        model_id: &str,
        body: &Value,
    ) -> Result<Vec<Vec<u8>>, BedrockError> {
        self.record("invoke_model_stream", model_id, body);
        Ok(self.stream_chunks.clone())
    }

    async fn start_async_invoke(
        &self,
        model_id: &str,
        model_input: &Value,
        output_s3_uri: &str,
    ) -> Result<String, BedrockError> {
        let mut body = model_input.clone();
        body["outputS3Uri"] = Value::String(output_s3_uri.to_string());
        self.record("start_async_invoke", model_id, &body);
        Ok("arn:aws:bedrock:us-east-1:123456789012:async-invoke/abc".into())
    }

    async fn get_async_invoke(
        &self,
        invocation_arn: &str,
    ) -> Result<AsyncInvokeDetails, BedrockError> {
        self.record("get_async_invoke", invocation_arn, &Value::Null);
        Ok(AsyncInvokeDetails {
            invocation_arn: invocation_arn.to_string(),
            model_arn: "arn:aws:bedrock:us-east-1::foundation-model/amazon.nova-reel-v1:0".into(),
            status: "InProgress".into(),
            output_s3_uri: Some("s3://gen-ai-exercise-dp01/video/abc".into()),
            submit_time: Some("2024-05-01T10:00:00Z".into()),
            ..AsyncInvokeDetails::default()
        })
    }
}

#[derive(Default)]
pub(crate) struct FakeJobs {
    pub(crate) submitted: Mutex<Vec<BatchJobRequest>>,
}

#[async_trait]
impl BatchJobs for FakeJobs {
    async fn create_model_invocation_job(
        &self,
        request: BatchJobRequest,
    ) -> Result<String, BedrockError> {
        let arn = format!(
            "arn:aws:bedrock:us-east-1:123456789012:model-invocation-job/{}",
            request.job_name
        );
        self.submitted.lock().expect("jobs lock").push(request);
        Ok(arn)
    }

    async fn get_model_invocation_job(
        &self,
        job_arn: &str,
    ) -> Result<BatchJobDetails, BedrockError> {
        Ok(BatchJobDetails {
            job_arn: job_arn.to_string(),
            model_id: "amazon.nova-micro-v1:0".into(),
            status: Some("Completed".into()),
            job_name: Some(DEFAULT_JOB_NAME.into()),
            input_s3_uri: Some("s3://in/records.jsonl".into()),
            output_s3_uri: Some("s3://out/".into()),
            end_time: Some("2024-05-01T11:00:00Z".into()),
            ..BatchJobDetails::default()
        })
    }
}

#[derive(Default)]
pub(crate) struct FakeStore {
    pub(crate) uploads: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
    ) -> Result<String, StorageError> {
        if !path.exists() {
            return Err(StorageError::Read {
                path: path.display().to_string(),
                message: "not found".into(),
            });
        }
        self.uploads
            .lock()
            .expect("uploads lock")
            .push((bucket.to_string(), key.to_string()));
        Ok(s3_uri(bucket, key))
    }
}
