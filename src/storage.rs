//! Object storage for uploaded claim documents.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_smithy_types::error::display::DisplayErrorContext;
use std::path::Path;
use thiserror::Error;

/// Errors raised while uploading documents.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The local file could not be opened for upload.
    #[error("failed to read {path}: {message}")]
    Read {
        /// Local path that was requested.
        path: String,
        /// Rendered failure.
        message: String,
    },
    /// The object store rejected the upload.
    #[error("failed to upload s3://{bucket}/{key}: {message}")]
    Upload {
        /// Target bucket.
        bucket: String,
        /// Target key.
        key: String,
        /// Rendered SDK error.
        message: String,
    },
}

/// Destination store for claim documents.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a local file to `bucket/key`, returning its `s3://` URI.
    async fn upload_file(&self, bucket: &str, key: &str, path: &Path)
    -> Result<String, StorageError>;
}

/// Key under which a local file is stored: the prefix followed by the file name.
pub fn object_key(prefix: &str, path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{prefix}{file_name}")
}

/// `s3://bucket/key` URI for an object.
pub fn s3_uri(bucket: &str, key: &str) -> String {
    format!("s3://{bucket}/{key}")
}

/// [`ObjectStore`] backed by Amazon S3.
#[derive(Clone, Debug)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    /// Build a store from shared SDK configuration.
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(aws_sdk_s3::Client::new(config))
    }

    /// Wrap an already configured SDK client.
    pub fn from_client(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
    ) -> Result<String, StorageError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|error| StorageError::Read {
                path: path.display().to_string(),
                message: error.to_string(),
            })?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|error| StorageError::Upload {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: DisplayErrorContext(&error).to_string(),
            })?;

        let uri = s3_uri(bucket, key);
        tracing::info!(%uri, "Uploaded claim document");
        Ok(uri)
    }
}
