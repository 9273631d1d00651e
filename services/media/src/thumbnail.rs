//! Thumbnail persistence strategies
//!
//! A deployment uses exactly one [`ThumbnailStore`]: either the image is
//! embedded in the video record as a `data:` URL, or it is written next to the
//! other static assets and referenced by URL.

use std::path::PathBuf;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::error::{MediaError, MediaResult};
use crate::transfer::key_to_path;

/// Capability to persist a thumbnail and return the URL to record
#[async_trait]
pub trait ThumbnailStore: Send + Sync {
    async fn store(
        &self,
        video_id: Uuid,
        content_type: &str,
        data: Vec<u8>,
    ) -> MediaResult<String>;
}

/// Embeds the image as a self-describing `data:` URL.
///
/// Nothing is written anywhere, but the stored record grows by roughly 4/3 of
/// the image size.
#[derive(Debug, Clone, Default)]
pub struct InlineEmbedder;

#[async_trait]
impl ThumbnailStore for InlineEmbedder {
    async fn store(
        &self,
        _video_id: Uuid,
        content_type: &str,
        data: Vec<u8>,
    ) -> MediaResult<String> {
        Ok(data_url(content_type, &data))
    }
}

pub fn data_url(content_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, STANDARD.encode(data))
}

/// Writes `<video_id>.<subtype>` under the asset root
#[derive(Debug, Clone)]
pub struct LocalDiskWriter {
    assets_root: PathBuf,
    assets_url: String,
}

impl LocalDiskWriter {
    /// `assets_url` is the public URL `assets_root` is served under
    pub fn new(assets_root: impl Into<PathBuf>, assets_url: impl Into<String>) -> Self {
        Self {
            assets_root: assets_root.into(),
            assets_url: assets_url.into(),
        }
    }
}

/// File extension for a media type: the token after the last `/`
pub fn extension_for(content_type: &str) -> &str {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence.rsplit('/').next().unwrap_or(essence)
}

#[async_trait]
impl ThumbnailStore for LocalDiskWriter {
    async fn store(
        &self,
        video_id: Uuid,
        content_type: &str,
        data: Vec<u8>,
    ) -> MediaResult<String> {
        let extension = extension_for(content_type);
        if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(MediaError::Thumbnail(format!(
                "cannot derive a file extension from {:?}",
                content_type
            )));
        }

        let file_name = format!("{}.{}", video_id, extension);
        let path = key_to_path(&self.assets_root, &file_name)?;

        fs::create_dir_all(&self.assets_root)
            .await
            .map_err(|e| MediaError::Thumbnail(e.to_string()))?;
        fs::write(&path, &data)
            .await
            .map_err(|e| MediaError::Thumbnail(e.to_string()))?;

        info!(path = %path.display(), size_bytes = data.len(), "Thumbnail written");
        Ok(format!(
            "{}/{}",
            self.assets_url.trim_end_matches('/'),
            file_name
        ))
    }
}
