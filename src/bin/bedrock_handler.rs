//! Lambda entrypoint for the Bedrock action handler.
//!
//! Clients are built once per cold start and shared across invocations.
use claim_intake::{
    bedrock::aws::{BedrockControlClient, BedrockRuntimeClient},
    config, logging,
    handler::BedrockHandler,
};
use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = config::init_config()?.clone();
    logging::init_tracing(config.log_file.as_deref());
    config.log_summary();

    let sdk_config = aws_config::from_env()
        .region(aws_config::Region::new(config.aws_region.clone()))
        .load()
        .await;
    let handler = Arc::new(BedrockHandler::new(
        Arc::new(BedrockRuntimeClient::new(&sdk_config)),
        Arc::new(BedrockControlClient::new(&sdk_config)),
        config,
    ));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let handler = Arc::clone(&handler);
        async move { handler.handle(event.payload).await.map_err(Error::from) }
    }))
    .await
}
