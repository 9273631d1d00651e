//! Video ingestion core
//!
//! The building blocks the upload handlers compose: staging the request body
//! on disk, classifying its orientation, deriving a storage key, transferring
//! the bytes to durable storage, and persisting thumbnails.

pub mod error;
pub mod keys;
pub mod probe;
pub mod staging;
pub mod thumbnail;
pub mod transfer;

pub use error::{MediaError, MediaResult};
pub use keys::generate_key;
pub use probe::{Dimensions, FfprobeProber, MediaProber, Orientation};
pub use staging::{StagedUpload, Stager};
pub use thumbnail::{InlineEmbedder, LocalDiskWriter, ThumbnailStore};
pub use transfer::{LocalObjectStore, ObjectStore, S3ObjectStore};
