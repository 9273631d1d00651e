//! Video repository for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Video;

/// Capability to read and rewrite video records
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Get a video by ID
    async fn get(&self, id: Uuid) -> DatabaseResult<Option<Video>>;

    /// Persist every mutable field of `video`.
    ///
    /// Fails with a query error wrapping `RowNotFound` when no such video
    /// exists.
    async fn update(&self, video: &Video) -> DatabaseResult<()>;
}

/// PostgreSQL-backed video store
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    /// Create a new video repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoStore for PgVideoRepository {
    async fn get(&self, id: Uuid) -> DatabaseResult<Option<Video>> {
        sqlx::query_as::<_, Video>(
            r#"
            SELECT id, created_at, updated_at, title, description,
                   thumbnail_url, video_url, user_id
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    async fn update(&self, video: &Video) -> DatabaseResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE videos
            SET title = $2,
                description = $3,
                thumbnail_url = $4,
                video_url = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(video.id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .bind(video.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::Query(sqlx::Error::RowNotFound));
        }

        Ok(())
    }
}
