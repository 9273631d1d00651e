//! Repositories for database operations

pub mod videos;

pub use videos::{PgVideoRepository, VideoStore};
