//! Durable object storage for uploaded videos
//!
//! Two backends share the [`ObjectStore`] capability: S3 (or an S3-compatible
//! endpoint) and a local directory served under `/assets`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{error, info};

use crate::error::{MediaError, MediaResult};

/// Capability to persist a staged file under a key
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stream `body` (positioned at its start) to `key` and return the URL
    /// under which the object can be fetched.
    ///
    /// On error the object must be treated as not written.
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        body: File,
        size: u64,
    ) -> MediaResult<String>;
}

/// S3 object store
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    region: String,
    endpoint_url: Option<String>,
}

impl S3ObjectStore {
    pub fn new(
        client: Client,
        bucket: impl Into<String>,
        region: impl Into<String>,
        endpoint_url: Option<String>,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            region: region.into(),
            endpoint_url,
        }
    }

    /// Build a client from the default AWS credential chain.
    ///
    /// A custom `endpoint_url` (MinIO, LocalStack, ...) switches to
    /// path-style addressing.
    pub async fn connect(bucket: String, region: String, endpoint_url: Option<String>) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        let client = Client::from_conf(builder.build());
        info!(bucket = %bucket, region = %region, "S3 client initialized");

        Self::new(client, bucket, region, endpoint_url)
    }

    /// URL of `key`, derived without a round trip to the store
    pub fn object_url(&self, key: &str) -> String {
        object_url(&self.bucket, &self.region, self.endpoint_url.as_deref(), key)
    }
}

/// `<endpoint>/<bucket>/<key>` for custom endpoints, the virtual-hosted AWS
/// form otherwise
pub fn object_url(bucket: &str, region: &str, endpoint_url: Option<&str>, key: &str) -> String {
    match endpoint_url {
        Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key),
        None => format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key),
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        body: File,
        size: u64,
    ) -> MediaResult<String> {
        let start = Instant::now();

        let stream = ByteStream::read_from()
            .file(body)
            .build()
            .await
            .map_err(|e| MediaError::Transfer(format!("failed to open staged file: {}", e)))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(stream)
            .send()
            .await
            .map_err(|e| {
                error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    "S3 upload failed"
                );
                MediaError::Transfer(DisplayErrorContext(&e).to_string())
            })?;

        info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(self.object_url(key))
    }
}

/// Object store writing below a local directory
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    base_url: String,
}

impl LocalObjectStore {
    /// `base_url` is the public prefix the `root` directory is served under
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Resolve `key` below `root`, refusing keys that could escape it
pub(crate) fn key_to_path(root: &Path, key: &str) -> MediaResult<PathBuf> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(MediaError::InvalidKey(key.to_string()));
    }
    Ok(root.join(key))
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(
        &self,
        key: &str,
        _content_type: &str,
        mut body: File,
        size: u64,
    ) -> MediaResult<String> {
        let path = key_to_path(&self.root, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| MediaError::Transfer(e.to_string()))?;
        }

        let result = async {
            let mut dest = File::create(&path).await?;
            tokio::io::copy(&mut body, &mut dest).await?;
            dest.flush().await
        }
        .await;

        if let Err(e) = result {
            // Never leave a truncated object behind
            let _ = fs::remove_file(&path).await;
            return Err(MediaError::Transfer(e.to_string()));
        }

        info!(path = %path.display(), size_bytes = size, "Object written to local store");
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }
}
