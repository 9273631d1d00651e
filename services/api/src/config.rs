//! Service configuration
//!
//! Loaded once at startup from environment variables and handed to the
//! application state; handlers never read the environment themselves.

use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

/// Where uploaded videos are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStorage {
    S3,
    Local,
}

/// How thumbnails are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailStrategy {
    /// Base64 `data:` URL stored on the video record
    Inline,
    /// File under the assets root, served by this service
    Local,
}

/// Application configuration
///
/// # Environment Variables
/// - `PORT`: listen port (default: 8091)
/// - `DATABASE_URL`: PostgreSQL connection URL (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 5)
/// - `JWT_SECRET`: HS256 secret for access tokens (required)
/// - `PUBLIC_BASE_URL`: externally visible base URL (default: "http://localhost:8091")
/// - `ASSETS_ROOT`: directory served under `/assets` (default: "./assets")
/// - `STAGING_DIR`: directory for staged uploads (default: OS temp dir)
/// - `FFPROBE_PATH`: prober executable (default: "ffprobe")
/// - `VIDEO_STORAGE`: `s3` or `local` (default: `s3`)
/// - `THUMBNAIL_STRATEGY`: `inline` or `local` (default: `inline`)
/// - `S3_BUCKET`, `S3_REGION` (default: "us-east-1"), `S3_ENDPOINT`
/// - `MAX_VIDEO_BYTES` (default: 1 GiB), `MAX_THUMBNAIL_BYTES` (default: 10 MiB)
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub public_base_url: String,
    pub assets_root: PathBuf,
    pub staging_dir: Option<PathBuf>,
    pub ffprobe_path: String,
    pub video_storage: VideoStorage,
    pub thumbnail_strategy: ThumbnailStrategy,
    #[serde(default)]
    pub s3_bucket: String,
    pub s3_region: String,
    pub s3_endpoint: Option<String>,
    pub max_video_bytes: usize,
    pub max_thumbnail_bytes: usize,
}

impl AppConfig {
    /// Load the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        let config = Config::builder()
            .set_default("port", 8091)?
            .set_default("database_max_connections", 5)?
            .set_default("public_base_url", "http://localhost:8091")?
            .set_default("assets_root", "./assets")?
            .set_default("ffprobe_path", "ffprobe")?
            .set_default("video_storage", "s3")?
            .set_default("thumbnail_strategy", "inline")?
            .set_default("s3_region", "us-east-1")?
            .set_default("max_video_bytes", 1i64 << 30)?
            .set_default("max_thumbnail_bytes", 10i64 << 20)?
            .add_source(Environment::default().try_parsing(true))
            .build()
            .context("Failed to read configuration")?;

        let config: AppConfig = config
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }
        if self.video_storage == VideoStorage::S3 && self.s3_bucket.trim().is_empty() {
            anyhow::bail!("S3_BUCKET is required when VIDEO_STORAGE is s3");
        }
        if self.max_video_bytes == 0 || self.max_thumbnail_bytes == 0 {
            anyhow::bail!("upload size limits must be positive");
        }
        Ok(())
    }

    /// Public URL the assets root is served under
    pub fn assets_url(&self) -> String {
        format!("{}/assets", self.public_base_url.trim_end_matches('/'))
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
