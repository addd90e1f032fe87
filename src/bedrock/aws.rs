//! AWS SDK adapters for the Bedrock client traits.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_bedrock::types::{
    ModelInvocationJobInputDataConfig, ModelInvocationJobOutputDataConfig,
    ModelInvocationJobS3InputDataConfig, ModelInvocationJobS3OutputDataConfig,
};
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::types::{
    AsyncInvokeOutputDataConfig, AsyncInvokeS3OutputDataConfig, ResponseStream,
};
use aws_smithy_types::DateTime;
use aws_smithy_types::date_time::Format;
use aws_smithy_types::error::display::DisplayErrorContext;
use serde_json::Value;

use super::{
    AsyncInvokeDetails, BatchJobDetails, BatchJobRequest, BatchJobs, BedrockError, ModelRuntime,
    json_to_document,
};

const JSON_CONTENT_TYPE: &str = "application/json";

fn request_error<E>(operation: &'static str, error: E) -> BedrockError
where
    E: std::error::Error,
{
    BedrockError::Request {
        operation,
        message: DisplayErrorContext(&error).to_string(),
    }
}

fn invalid_request(error: impl std::fmt::Display) -> BedrockError {
    BedrockError::InvalidRequest(error.to_string())
}

fn json_body(body: &Value) -> Result<Blob, BedrockError> {
    serde_json::to_vec(body)
        .map(Blob::new)
        .map_err(invalid_request)
}

fn owned<'a>(value: impl Into<Option<&'a str>>) -> Option<String> {
    value.into().map(str::to_string)
}

fn rfc3339<'a>(time: impl Into<Option<&'a DateTime>>) -> Option<String> {
    time.into().and_then(|time| time.fmt(Format::DateTime).ok())
}

fn async_output_uri<'a>(
    config: impl Into<Option<&'a AsyncInvokeOutputDataConfig>>,
) -> Option<String> {
    let s3 = config.into()?.as_s3_output_data_config().ok()?;
    owned(s3.s3_uri())
}

fn batch_input_uri<'a>(
    config: impl Into<Option<&'a ModelInvocationJobInputDataConfig>>,
) -> Option<String> {
    let s3 = config.into()?.as_s3_input_data_config().ok()?;
    owned(s3.s3_uri())
}

fn batch_output_uri<'a>(
    config: impl Into<Option<&'a ModelInvocationJobOutputDataConfig>>,
) -> Option<String> {
    let s3 = config.into()?.as_s3_output_data_config().ok()?;
    owned(s3.s3_uri())
}

/// [`ModelRuntime`] backed by the `bedrock-runtime` service.
#[derive(Clone, Debug)]
pub struct BedrockRuntimeClient {
    client: aws_sdk_bedrockruntime::Client,
}

impl BedrockRuntimeClient {
    /// Build a client from shared SDK configuration.
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(aws_sdk_bedrockruntime::Client::new(config))
    }

    /// Wrap an already configured SDK client.
    pub fn from_client(client: aws_sdk_bedrockruntime::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ModelRuntime for BedrockRuntimeClient {
    async fn invoke_model(&self, model_id: &str, body: &Value) -> Result<Vec<u8>, BedrockError> {
        let response = self
            .client
            .invoke_model()
            .model_id(model_id)
            .body(json_body(body)?)
            .content_type(JSON_CONTENT_TYPE)
            .accept(JSON_CONTENT_TYPE)
            .send()
            .await
            .map_err(|error| request_error("InvokeModel", error))?;
        Ok(response.body.into_inner())
    }

    async fn invoke_model_stream(
        &self,
        model_id: &str,
        body: &Value,
    ) -> Result<Vec<Vec<u8>>, BedrockError> {
        let mut response = self
            .client
            .invoke_model_with_response_stream()
            .model_id(model_id)
            .body(json_body(body)?)
            .content_type(JSON_CONTENT_TYPE)
            .accept(JSON_CONTENT_TYPE)
            .send()
            .await
            .map_err(|error| request_error("InvokeModelWithResponseStream", error))?;

        let mut chunks = Vec::new();
        loop {
            match response.body.recv().await {
                Ok(Some(ResponseStream::Chunk(part))) => {
                    if let Some(bytes) = part.bytes {
                        chunks.push(bytes.into_inner());
                    }
                }
                Ok(Some(other)) => {
                    tracing::debug!(event = ?other, "Ignoring unrecognized stream event");
                }
                Ok(None) => break,
                Err(error) => {
                    return Err(BedrockError::Stream(
                        DisplayErrorContext(&error).to_string(),
                    ));
                }
            }
        }
        tracing::debug!(model = model_id, chunks = chunks.len(), "Drained response stream");
        Ok(chunks)
    }

    async fn start_async_invoke(
        &self,
        model_id: &str,
        model_input: &Value,
        output_s3_uri: &str,
    ) -> Result<String, BedrockError> {
        let s3_output = AsyncInvokeS3OutputDataConfig::builder()
            .s3_uri(output_s3_uri)
            .build()
            .map_err(invalid_request)?;
        let response = self
            .client
            .start_async_invoke()
            .model_id(model_id)
            .model_input(json_to_document(model_input))
            .output_data_config(AsyncInvokeOutputDataConfig::S3OutputDataConfig(s3_output))
            .send()
            .await
            .map_err(|error| request_error("StartAsyncInvoke", error))?;
        Ok(response.invocation_arn)
    }

    async fn get_async_invoke(
        &self,
        invocation_arn: &str,
    ) -> Result<AsyncInvokeDetails, BedrockError> {
        let response = self
            .client
            .get_async_invoke()
            .invocation_arn(invocation_arn)
            .send()
            .await
            .map_err(|error| request_error("GetAsyncInvoke", error))?;
        Ok(AsyncInvokeDetails {
            invocation_arn: response.invocation_arn().to_string(),
            model_arn: response.model_arn().to_string(),
            status: response.status().as_str().to_string(),
            failure_message: response.failure_message().map(str::to_string),
            output_s3_uri: async_output_uri(response.output_data_config()),
            submit_time: rfc3339(response.submit_time()),
            last_modified_time: rfc3339(response.last_modified_time()),
            end_time: rfc3339(response.end_time()),
        })
    }
}

/// [`BatchJobs`] backed by the `bedrock` control-plane service.
#[derive(Clone, Debug)]
pub struct BedrockControlClient {
    client: aws_sdk_bedrock::Client,
}

impl BedrockControlClient {
    /// Build a client from shared SDK configuration.
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(aws_sdk_bedrock::Client::new(config))
    }

    /// Wrap an already configured SDK client.
    pub fn from_client(client: aws_sdk_bedrock::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BatchJobs for BedrockControlClient {
    async fn create_model_invocation_job(
        &self,
        request: BatchJobRequest,
    ) -> Result<String, BedrockError> {
        let input = ModelInvocationJobS3InputDataConfig::builder()
            .s3_uri(request.input_s3_uri)
            .build()
            .map_err(invalid_request)?;
        let output = ModelInvocationJobS3OutputDataConfig::builder()
            .s3_uri(request.output_s3_uri)
            .build()
            .map_err(invalid_request)?;
        let response = self
            .client
            .create_model_invocation_job()
            .role_arn(request.role_arn)
            .model_id(request.model_id)
            .job_name(request.job_name)
            .input_data_config(ModelInvocationJobInputDataConfig::S3InputDataConfig(input))
            .output_data_config(ModelInvocationJobOutputDataConfig::S3OutputDataConfig(output))
            .send()
            .await
            .map_err(|error| request_error("CreateModelInvocationJob", error))?;
        Ok(response.job_arn)
    }

    async fn get_model_invocation_job(
        &self,
        job_arn: &str,
    ) -> Result<BatchJobDetails, BedrockError> {
        let response = self
            .client
            .get_model_invocation_job()
            .job_identifier(job_arn)
            .send()
            .await
            .map_err(|error| request_error("GetModelInvocationJob", error))?;
        Ok(BatchJobDetails {
            job_arn: response.job_arn().to_string(),
            model_id: response.model_id().to_string(),
            status: response.status().map(|status| status.as_str().to_string()),
            message: response.message().map(str::to_string),
            job_name: owned(response.job_name()),
            role_arn: owned(response.role_arn()),
            input_s3_uri: batch_input_uri(response.input_data_config()),
            output_s3_uri: batch_output_uri(response.output_data_config()),
            submit_time: rfc3339(response.submit_time()),
            last_modified_time: rfc3339(response.last_modified_time()),
            end_time: rfc3339(response.end_time()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_bedrockruntime::config::{BehaviorVersion, Credentials, Region};
    use httpmock::{
        Method::{GET, POST},
        MockServer,
    };
    use serde_json::json;

    fn client_for(server: &MockServer) -> BedrockRuntimeClient {
        let config = aws_sdk_bedrockruntime::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .endpoint_url(server.base_url())
            .credentials_provider(Credentials::new("test", "test", None, None, "static"))
            .build();
        BedrockRuntimeClient::from_client(aws_sdk_bedrockruntime::Client::from_conf(config))
    }

    fn control_client_for(server: &MockServer) -> BedrockControlClient {
        let config = aws_sdk_bedrock::Config::builder()
            .behavior_version(aws_sdk_bedrock::config::BehaviorVersion::latest())
            .region(aws_sdk_bedrock::config::Region::new("us-east-1"))
            .endpoint_url(server.base_url())
            .credentials_provider(aws_sdk_bedrock::config::Credentials::new(
                "test", "test", None, None, "static",
            ))
            .build();
        BedrockControlClient::from_client(aws_sdk_bedrock::Client::from_conf(config))
    }

    #[tokio::test]
    async fn invoke_model_returns_raw_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path_contains("/invoke")
                    .body_contains("messages-v1");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .body(r#"{"outputText":"hello"}"#);
            })
            .await;

        let body = client_for(&server)
            .invoke_model(
                "amazon.nova-micro-v1:0",
                &json!({"schemaVersion": "messages-v1", "messages": []}),
            )
            .await
            .expect("body");

        mock.assert_async().await;
        assert_eq!(body, br#"{"outputText":"hello"}"#.to_vec());
    }

    #[tokio::test]
    async fn invoke_model_maps_service_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path_contains("/invoke");
                then.status(400)
                    .header("Content-Type", "application/json")
                    .header("x-amzn-ErrorType", "ValidationException")
                    .body(r#"{"message":"bad input"}"#);
            })
            .await;

        let error = client_for(&server)
            .invoke_model("amazon.nova-micro-v1:0", &json!({}))
            .await
            .expect_err("service error");

        assert!(matches!(
            error,
            BedrockError::Request { operation: "InvokeModel", .. }
        ));
    }

    #[tokio::test]
    async fn start_async_invoke_sends_model_input_and_output_location() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/async-invoke")
                    .body_contains("amazon.nova-reel-v1:0")
                    .body_contains("TEXT_VIDEO")
                    .body_contains("s3://videos/video/");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .body(r#"{"invocationArn":"arn:aws:bedrock:us-east-1:1:async-invoke/abc"}"#);
            })
            .await;

        let arn = client_for(&server)
            .start_async_invoke(
                "amazon.nova-reel-v1:0",
                &json!({"taskType": "TEXT_VIDEO", "videoGenerationConfig": {"seed": 7}}),
                "s3://videos/video/",
            )
            .await
            .expect("invocation arn");

        mock.assert_async().await;
        assert_eq!(arn, "arn:aws:bedrock:us-east-1:1:async-invoke/abc");
    }

    #[tokio::test]
    async fn get_async_invoke_reports_output_location_and_times() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path_contains("/async-invoke/");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .body(
                        json!({
                            "invocationArn": "arn:inv",
                            "modelArn": "arn:model",
                            "status": "Completed",
                            "submitTime": "2024-05-01T10:00:00Z",
                            "endTime": "2024-05-01T10:05:00Z",
                            "outputDataConfig": {
                                "s3OutputDataConfig": {"s3Uri": "s3://videos/video/abc"}
                            }
                        })
                        .to_string(),
                    );
            })
            .await;

        let details = client_for(&server)
            .get_async_invoke("arn:inv")
            .await
            .expect("details");

        mock.assert_async().await;
        assert_eq!(details.status, "Completed");
        assert_eq!(details.output_s3_uri.as_deref(), Some("s3://videos/video/abc"));
        assert_eq!(details.submit_time.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(details.end_time.as_deref(), Some("2024-05-01T10:05:00Z"));
        assert_eq!(details.last_modified_time, None);
    }

    #[tokio::test]
    async fn create_model_invocation_job_sends_data_locations() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/model-invocation-job")
                    .body_contains("arn:role")
                    .body_contains("nightly")
                    .body_contains("s3://in/records.jsonl")
                    .body_contains("s3://out/");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .body(r#"{"jobArn":"arn:job"}"#);
            })
            .await;

        let arn = control_client_for(&server)
            .create_model_invocation_job(BatchJobRequest {
                role_arn: "arn:role".into(),
                model_id: "amazon.nova-micro-v1:0".into(),
                job_name: "nightly".into(),
                input_s3_uri: "s3://in/records.jsonl".into(),
                output_s3_uri: "s3://out/".into(),
            })
            .await
            .expect("job arn");

        mock.assert_async().await;
        assert_eq!(arn, "arn:job");
    }

    #[tokio::test]
    async fn get_model_invocation_job_reports_job_configuration() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path_contains("/model-invocation-job/");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .body(
                        json!({
                            "jobArn": "arn:job",
                            "jobName": "nightly",
                            "modelId": "amazon.nova-micro-v1:0",
                            "roleArn": "arn:role",
                            "status": "InProgress",
                            "submitTime": "2024-05-01T10:00:00Z",
                            "inputDataConfig": {
                                "s3InputDataConfig": {"s3Uri": "s3://in/records.jsonl"}
                            },
                            "outputDataConfig": {
                                "s3OutputDataConfig": {"s3Uri": "s3://out/"}
                            }
                        })
                        .to_string(),
                    );
            })
            .await;

        let details = control_client_for(&server)
            .get_model_invocation_job("arn:job")
            .await
            .expect("details");

        mock.assert_async().await;
        assert_eq!(details.status.as_deref(), Some("InProgress"));
        assert_eq!(details.job_name.as_deref(), Some("nightly"));
        assert_eq!(details.role_arn.as_deref(), Some("arn:role"));
        assert_eq!(details.input_s3_uri.as_deref(), Some("s3://in/records.jsonl"));
        assert_eq!(details.output_s3_uri.as_deref(), Some("s3://out/"));
        assert_eq!(details.submit_time.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(details.end_time, None);
    }
}
