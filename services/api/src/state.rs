//! Application state shared across handlers

use std::sync::Arc;

use media::{
    FfprobeProber, InlineEmbedder, LocalDiskWriter, LocalObjectStore, MediaProber, ObjectStore,
    S3ObjectStore, Stager, ThumbnailStore,
};
use sqlx::PgPool;
use tracing::info;

use crate::{
    auth::JwtValidator,
    config::{AppConfig, ThumbnailStrategy, VideoStorage},
    repositories::{PgVideoRepository, VideoStore},
};

/// Suffix of staged video files
pub const STAGED_VIDEO_SUFFIX: &str = ".mp4";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: JwtValidator,
    pub videos: Arc<dyn VideoStore>,
    pub stager: Stager,
    pub prober: Arc<dyn MediaProber>,
    pub objects: Arc<dyn ObjectStore>,
    pub thumbnails: Arc<dyn ThumbnailStore>,
}

impl AppState {
    /// Wire the production collaborators selected by `config`
    pub async fn from_config(config: AppConfig, pool: PgPool) -> Self {
        let objects: Arc<dyn ObjectStore> = match config.video_storage {
            VideoStorage::S3 => Arc::new(
                S3ObjectStore::connect(
                    config.s3_bucket.clone(),
                    config.s3_region.clone(),
                    config.s3_endpoint.clone(),
                )
                .await,
            ),
            VideoStorage::Local => Arc::new(LocalObjectStore::new(
                config.assets_root.clone(),
                config.assets_url(),
            )),
        };

        let thumbnails: Arc<dyn ThumbnailStore> = match config.thumbnail_strategy {
            ThumbnailStrategy::Inline => Arc::new(InlineEmbedder),
            ThumbnailStrategy::Local => Arc::new(LocalDiskWriter::new(
                config.assets_root.clone(),
                config.assets_url(),
            )),
        };

        info!(
            video_storage = ?config.video_storage,
            thumbnail_strategy = ?config.thumbnail_strategy,
            "Storage backends selected"
        );

        Self {
            auth: JwtValidator::new(&config.jwt_secret),
            videos: Arc::new(PgVideoRepository::new(pool)),
            stager: Stager::new(config.staging_dir(), STAGED_VIDEO_SUFFIX),
            prober: Arc::new(FfprobeProber::new(config.ffprobe_path.clone())),
            objects,
            thumbnails,
            config: Arc::new(config),
        }
    }
}
