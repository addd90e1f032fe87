use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Default AWS region used when `AWS_REGION` is unset.
pub const DEFAULT_REGION: &str = "us-east-1";
/// Default Bedrock model for text generation and extraction.
pub const DEFAULT_TEXT_MODEL_ID: &str = "amazon.nova-micro-v1:0";
/// Default Bedrock model for video generation.
pub const DEFAULT_VIDEO_MODEL_ID: &str = "amazon.nova-reel-v1:0";
/// Default bucket receiving generated videos.
pub const DEFAULT_VIDEO_BUCKET: &str = "gen-ai-exercise-dp01";
/// Default key prefix for uploaded claim documents.
pub const DEFAULT_CLAIMS_KEY_PREFIX: &str = "claims/";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be used.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration shared by the claim pipeline and the Lambda handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// AWS region passed to every SDK client.
    pub aws_region: String,
    /// Bedrock model used for messages-style text calls.
    pub text_model_id: String,
    /// Bedrock model used for asynchronous video generation.
    pub video_model_id: String,
    /// Bucket receiving generated video output.
    pub video_bucket: String,
    /// Prefix prepended to uploaded claim document keys.
    pub claims_key_prefix: String,
    /// Optional path for an append-only log file.
    pub log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aws_region: DEFAULT_REGION.into(),
            text_model_id: DEFAULT_TEXT_MODEL_ID.into(),
            video_model_id: DEFAULT_VIDEO_MODEL_ID.into(),
            video_bucket: DEFAULT_VIDEO_BUCKET.into(),
            claims_key_prefix: DEFAULT_CLAIMS_KEY_PREFIX.into(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, applying defaults for unset values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset. Identifiers that must not contain whitespace are
    /// rejected with [`ConfigError::InvalidValue`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let config = Self {
            aws_region: value("AWS_REGION").unwrap_or(defaults.aws_region),
            text_model_id: value("TEXT_MODEL_ID").unwrap_or(defaults.text_model_id),
            video_model_id: value("MODEL_ID").unwrap_or(defaults.video_model_id),
            video_bucket: value("VIDEO_BUCKET").unwrap_or(defaults.video_bucket),
            claims_key_prefix: value("CLAIMS_KEY_PREFIX").unwrap_or(defaults.claims_key_prefix),
            log_file: value("CLAIM_INTAKE_LOG_FILE"),
        };

        for (key, candidate) in [
            ("AWS_REGION", &config.aws_region),
            ("TEXT_MODEL_ID", &config.text_model_id),
            ("MODEL_ID", &config.video_model_id),
            ("VIDEO_BUCKET", &config.video_bucket),
        ] {
            if candidate.contains(char::is_whitespace) {
                return Err(ConfigError::InvalidValue(key.to_string()));
            }
        }

        Ok(config)
    }

    /// Record the effective settings; call once logging is installed.
    pub fn log_summary(&self) {
        tracing::info!(
            region = %self.aws_region,
            text_model = %self.text_model_id,
            video_model = %self.video_model_id,
            video_bucket = %self.video_bucket,
            "Loaded configuration"
        );
    }

    /// S3 prefix under which generated videos are written.
    pub fn video_output_uri(&self) -> String {
        format!("s3://{}/video/", self.video_bucket)
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    Ok(CONFIG.get_or_init(|| config))
}
