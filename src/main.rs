use anyhow::{Context, Result};
use clap::Parser;
use claim_intake::{
    bedrock::{MessagesInvoker, aws::BedrockRuntimeClient},
    config, logging,
    pipeline::{ClaimPipeline, ClaimRequest},
    retrieval::DEFAULT_TOP_K,
    storage::S3ObjectStore,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "claim-intake", about = "Claim processing pipeline")]
struct Cli {
    /// S3 bucket for claim documents
    #[arg(long)]
    bucket: String,
    /// Local path to claim text file
    #[arg(long)]
    file: PathBuf,
    /// Path to policy snippets JSON
    #[arg(long)]
    policies: PathBuf,
    /// Number of policy snippets used as context
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = config::init_config().context("failed to load configuration")?;
    logging::init_tracing(config.log_file.as_deref());
    config.log_summary();

    let sdk_config = aws_config::from_env()
        .region(aws_config::Region::new(config.aws_region.clone()))
        .load()
        .await;
    let runtime = Arc::new(BedrockRuntimeClient::new(&sdk_config));
    let pipeline = ClaimPipeline::new(
        Arc::new(S3ObjectStore::new(&sdk_config)),
        MessagesInvoker::new(runtime, config.text_model_id.clone()),
        config.claims_key_prefix.clone(),
    );

    let request = ClaimRequest {
        bucket: cli.bucket,
        file: cli.file,
        policies: cli.policies,
        top_k: cli.top_k,
    };
    let report = pipeline
        .process(&request)
        .await
        .context("claim processing failed")?;

    let output = serde_json::to_string_pretty(&report).context("failed to encode report")?;
    println!("{output}");
    Ok(())
}
