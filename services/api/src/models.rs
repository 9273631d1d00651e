//! API models for the video metadata store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A video record
///
/// Uploads only ever replace `thumbnail_url` or `video_url` and bump
/// `updated_at`; every other field is written back exactly as it was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Video {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub user_id: Uuid,
}

impl Video {
    /// Copy of this record pointing at a new video object
    pub fn with_video_url(&self, url: String) -> Self {
        Self {
            video_url: Some(url),
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Copy of this record pointing at a new thumbnail
    pub fn with_thumbnail_url(&self, url: String) -> Self {
        Self {
            thumbnail_url: Some(url),
            updated_at: Utc::now(),
            ..self.clone()
        }
    }
}
