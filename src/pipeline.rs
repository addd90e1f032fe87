//! Claim processing pipeline: upload, retrieve, extract, validate, summarize.
//!
//! Every external collaborator is injected so the pipeline can run against fakes. The steps run
//! strictly in sequence and any client failure aborts the whole run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::bedrock::{BedrockError, MessagesInvoker};
use crate::normalize::{JsonExtraction, extract_json_object, normalize_payload};
use crate::prompts::{InferenceConfig, build_extraction_prompt, build_summary_prompt};
use crate::retrieval::{
    DEFAULT_TOP_K, RetrievalError, format_policy_context, load_policies, retrieve_relevant,
};
use crate::storage::{ObjectStore, StorageError, object_key};
use crate::validation::{ExtractedClaim, validate_extraction};

/// Sampling parameters for the field-extraction call.
pub const EXTRACTION_INFERENCE: InferenceConfig = InferenceConfig::new(400, 0.2);
/// Sampling parameters for the summary call.
pub const SUMMARY_INFERENCE: InferenceConfig = InferenceConfig::new(500, 0.4);

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Uploading the claim document failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The claim document could not be read.
    #[error("failed to read claim text from {path}: {source}")]
    ClaimText {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Policies could not be loaded.
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
    /// A model call failed.
    #[error(transparent)]
    Model(#[from] BedrockError),
}

/// Inputs for one pipeline run.
#[derive(Debug, Clone)]
pub struct ClaimRequest {
    /// Bucket receiving the claim document.
    pub bucket: String,
    /// Local claim text file.
    pub file: PathBuf,
    /// Local JSON file of policy snippets.
    pub policies: PathBuf,
    /// Number of policy snippets used as context.
    pub top_k: usize,
}

impl ClaimRequest {
    /// Request using the default number of policy snippets.
    pub fn new(bucket: impl Into<String>, file: impl Into<PathBuf>, policies: impl Into<PathBuf>) -> Self {
        Self {
            bucket: bucket.into(),
            file: file.into(),
            policies: policies.into(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Document printed at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReport {
    /// Where the claim document was uploaded.
    pub s3_uri: String,
    /// Validated claim fields.
    pub extracted: ExtractedClaim,
    /// Examiner-facing summary text.
    pub summary: String,
    /// Policy context given to the summary prompt.
    pub policy_context_used: String,
}

/// Orchestrates a claim run over injected storage and model clients.
pub struct ClaimPipeline {
    store: Arc<dyn ObjectStore>,
    invoker: MessagesInvoker,
    key_prefix: String,
}

impl ClaimPipeline {
    /// Assemble a pipeline; uploaded keys are `key_prefix` followed by the file name.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        invoker: MessagesInvoker,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            invoker,
            key_prefix: key_prefix.into(),
        }
    }

    /// Run every step for one claim and return the report.
    pub async fn process(&self, request: &ClaimRequest) -> Result<ClaimReport, PipelineError> {
        let key = object_key(&self.key_prefix, &request.file);
        let s3_uri = self
            .store
            .upload_file(&request.bucket, &key, &request.file)
            .await?;
        let claim_text = read_claim_text(&request.file)?;

        let policies = load_policies(&request.policies)?;
        let relevant = retrieve_relevant(&claim_text, &policies, request.top_k);
        let policy_context = format_policy_context(&relevant);
        tracing::info!(
            policies = policies.len(),
            selected = relevant.len(),
            "Selected policy context"
        );

        let extracted = self.extract_fields(&claim_text).await?;
        let summary = self.summarize(&claim_text, &policy_context).await?;

        Ok(ClaimReport {
            s3_uri,
            extracted,
            summary,
            policy_context_used: policy_context,
        })
    }

    async fn extract_fields(&self, claim_text: &str) -> Result<ExtractedClaim, PipelineError> {
        let payload = self
            .invoker
            .invoke_messages(
                vec![build_extraction_prompt(claim_text)],
                EXTRACTION_INFERENCE,
                None,
            )
            .await?;
        let outcome = normalize_payload(&payload);
        if outcome.is_degraded() {
            tracing::warn!(outcome = outcome.kind(), "Extraction response had no known text shape");
        }

        let extraction = extract_json_object(outcome.text());
        if !matches!(extraction, JsonExtraction::Parsed(_)) {
            tracing::warn!(
                extraction = extraction.kind(),
                "Extraction output was not a bare JSON object"
            );
        }

        let claim = validate_extraction(&extraction.into_map());
        tracing::info!(missing_fields = claim.missing_count(), "Validated extracted fields");
        Ok(claim)
    }

    async fn summarize(&self, claim_text: &str, policy_context: &str) -> Result<String, PipelineError> {
        let payload = self
            .invoker
            .invoke_messages(
                vec![build_summary_prompt(claim_text, policy_context)],
                SUMMARY_INFERENCE,
                None,
            )
            .await?;
        let outcome = normalize_payload(&payload);
        if outcome.is_degraded() {
            tracing::warn!(outcome = outcome.kind(), "Summary response had no known text shape");
        }
        Ok(outcome.into_text())
    }
}

fn read_claim_text(path: &Path) -> Result<String, PipelineError> {
    std::fs::read_to_string(path).map_err(|source| PipelineError::ClaimText {
        path: path.to_path_buf(),
        source,
    })
}
