//! In-memory collaborators and request builders for the upload tests

#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use api::{
    auth::{Claims, JwtValidator, TOKEN_ISSUER},
    config::{AppConfig, ThumbnailStrategy, VideoStorage},
    models::Video,
    repositories::VideoStore,
    routes::create_router,
    state::{AppState, STAGED_VIDEO_SUFFIX},
};
use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use jsonwebtoken::{EncodingKey, Header};
use media::{
    Dimensions, InlineEmbedder, LocalDiskWriter, MediaError, MediaProber, MediaResult,
    ObjectStore, Stager, ThumbnailStore,
};
use tempfile::TempDir;
use tokio::{fs::File, io::AsyncReadExt};
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret";
pub const BOUNDARY: &str = "tubely-test-boundary";
pub const OBJECT_BASE_URL: &str = "https://tubely-test.s3.us-east-1.amazonaws.com";

#[derive(Default)]
pub struct InMemoryVideoStore {
    videos: Mutex<HashMap<Uuid, Video>>,
    updates: AtomicUsize,
}

impl InMemoryVideoStore {
    pub fn insert(&self, video: Video) {
        self.videos.lock().unwrap().insert(video.id, video);
    }

    pub fn snapshot(&self, id: Uuid) -> Option<Video> {
        self.videos.lock().unwrap().get(&id).cloned()
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoStore {
    async fn get(&self, id: Uuid) -> DatabaseResult<Option<Video>> {
        Ok(self.snapshot(id))
    }

    async fn update(&self, video: &Video) -> DatabaseResult<()> {
        let mut videos = self.videos.lock().unwrap();
        match videos.get_mut(&video.id) {
            Some(existing) => {
                *existing = video.clone();
                self.updates.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            None => Err(DatabaseError::Query(sqlx::Error::RowNotFound)),
        }
    }
}

/// Object store that reads each body to the end and remembers what it saw
#[derive(Default)]
pub struct RecordingObjectStore {
    fail: bool,
    puts: Mutex<Vec<StoredObject>>,
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub content_type: String,
    pub declared_size: u64,
    pub data: Vec<u8>,
}

impl RecordingObjectStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn puts(&self) -> Vec<StoredObject> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for RecordingObjectStore {
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        mut body: File,
        size: u64,
    ) -> MediaResult<String> {
        if self.fail {
            return Err(MediaError::Transfer("bucket unavailable".to_string()));
        }

        let mut data = Vec::new();
        body.read_to_end(&mut data)
            .await
            .map_err(|e| MediaError::Transfer(e.to_string()))?;

        self.puts.lock().unwrap().push(StoredObject {
            key: key.to_string(),
            content_type: content_type.to_string(),
            declared_size: size,
            data,
        });
        Ok(format!("{}/{}", OBJECT_BASE_URL, key))
    }
}

/// Prober answering with fixed dimensions for any staged file that exists
pub struct StubProber {
    dimensions: Dimensions,
    fail: bool,
    calls: AtomicUsize,
}

impl StubProber {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            dimensions: Dimensions::new(width, height),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(0, 0)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaProber for StubProber {
    async fn dimensions(&self, path: &Path) -> MediaResult<Dimensions> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(MediaError::Probe(format!(
                "{} does not exist",
                path.display()
            )));
        }
        if self.fail {
            return Err(MediaError::Probe("no video stream".to_string()));
        }
        Ok(self.dimensions)
    }
}

pub struct TestOptions {
    pub prober: StubProber,
    pub objects: RecordingObjectStore,
    pub thumbnail_strategy: ThumbnailStrategy,
    pub max_thumbnail_bytes: usize,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            prober: StubProber::new(1280, 720),
            objects: RecordingObjectStore::default(),
            thumbnail_strategy: ThumbnailStrategy::Inline,
            max_thumbnail_bytes: 10 << 20,
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub videos: Arc<InMemoryVideoStore>,
    pub objects: Arc<RecordingObjectStore>,
    pub prober: Arc<StubProber>,
    pub staging: TempDir,
    pub assets: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_options(TestOptions::default())
    }

    pub fn with_options(options: TestOptions) -> Self {
        let staging = TempDir::new().unwrap();
        let assets = TempDir::new().unwrap();

        let config = AppConfig {
            port: 0,
            database_url: "postgresql://unused".to_string(),
            database_max_connections: 1,
            jwt_secret: JWT_SECRET.to_string(),
            public_base_url: "http://localhost:8091".to_string(),
            assets_root: assets.path().to_path_buf(),
            staging_dir: Some(staging.path().to_path_buf()),
            ffprobe_path: "ffprobe".to_string(),
            video_storage: VideoStorage::S3,
            thumbnail_strategy: options.thumbnail_strategy,
            s3_bucket: "tubely-test".to_string(),
            s3_region: "us-east-1".to_string(),
            s3_endpoint: None,
            max_video_bytes: 64 << 20,
            max_thumbnail_bytes: options.max_thumbnail_bytes,
        };

        let videos = Arc::new(InMemoryVideoStore::default());
        let objects = Arc::new(options.objects);
        let prober = Arc::new(options.prober);
        let thumbnails: Arc<dyn ThumbnailStore> = match config.thumbnail_strategy {
            ThumbnailStrategy::Inline => Arc::new(InlineEmbedder),
            ThumbnailStrategy::Local => Arc::new(LocalDiskWriter::new(
                config.assets_root.clone(),
                config.assets_url(),
            )),
        };

        let state = AppState {
            auth: JwtValidator::new(JWT_SECRET),
            videos: videos.clone(),
            stager: Stager::new(config.staging_dir(), STAGED_VIDEO_SUFFIX),
            prober: prober.clone(),
            objects: objects.clone(),
            thumbnails,
            config: Arc::new(config),
        };

        Self {
            router: create_router(state),
            videos,
            objects,
            prober,
            staging,
            assets,
        }
    }

    /// Seed a video owned by `owner` and return its id
    pub fn seed_video(&self, owner: Uuid) -> Uuid {
        let created = Utc::now() - chrono::Duration::minutes(5);
        let video = Video {
            id: Uuid::new_v4(),
            created_at: created,
            updated_at: created,
            title: "Boots on the ground".to_string(),
            description: "A walk through the valley".to_string(),
            thumbnail_url: None,
            video_url: None,
            user_id: owner,
        };
        let id = video.id;
        self.videos.insert(video);
        id
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Files left behind in the staging directory
    pub fn staged_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.staging.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }
}

pub fn token_for(user_id: Uuid) -> String {
    let now = Utc::now().timestamp() as u64;
    let claims = Claims {
        sub: user_id,
        iss: TOKEN_ISSUER.to_string(),
        iat: now,
        exp: now + 3600,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn upload_request(
    uri: &str,
    token: Option<&str>,
    field: &str,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", BOUNDARY),
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(multipart_body(field, "upload", content_type, data)))
        .unwrap()
}

pub fn video_request(
    video_id: &str,
    token: Option<&str>,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    upload_request(
        &format!("/api/video_upload/{}", video_id),
        token,
        "video",
        content_type,
        data,
    )
}

pub fn thumbnail_request(
    video_id: &str,
    token: Option<&str>,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    upload_request(
        &format!("/api/thumbnail_upload/{}", video_id),
        token,
        "thumbnail",
        content_type,
        data,
    )
}

pub async fn json_body<T: serde::de::DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
