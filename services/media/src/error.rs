//! Error types for the ingestion pipeline

use thiserror::Error;

/// Failure of one ingestion stage.
///
/// Every variant is a server-side fault: the client could not have prevented
/// it by sending a different request.
#[derive(Error, Debug)]
pub enum MediaError {
    /// Creating, filling or rewinding the staged file failed
    #[error("Staging error: {0}")]
    Staging(#[source] std::io::Error),

    /// The media prober failed or produced unusable output
    #[error("Probe error: {0}")]
    Probe(String),

    /// The object store rejected or aborted the transfer
    #[error("Transfer error: {0}")]
    Transfer(String),

    /// A storage key would escape its storage root
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Persisting a thumbnail failed
    #[error("Thumbnail error: {0}")]
    Thumbnail(String),
}

/// Type alias for Result with MediaError
pub type MediaResult<T> = Result<T, MediaError>;
