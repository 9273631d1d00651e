//! Request-scoped staging of upload bodies on local disk
//!
//! Uploads can be up to a gigabyte, so the body is streamed into a private
//! temporary file instead of memory. The file is unlinked when the
//! [`StagedUpload`] is dropped, whichever way the request ends.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeekExt, AsyncWriteExt};
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Name prefix of every staged file
pub const STAGING_PREFIX: &str = "tubely-upload";

/// Creates staged uploads inside one directory
#[derive(Debug, Clone)]
pub struct Stager {
    dir: PathBuf,
    suffix: String,
}

impl Stager {
    /// Stage into `dir`; `suffix` is appended to each random file name
    pub fn new(dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            suffix: suffix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `reader` to a fresh temporary file and rewind it.
    ///
    /// The file is owned by a deletion guard from the moment it is created,
    /// so a failed copy leaves nothing behind.
    pub async fn stage<R>(&self, reader: &mut R) -> MediaResult<StagedUpload>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let temp = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(&self.suffix)
            .tempfile_in(&self.dir)
            .map_err(MediaError::Staging)?;
        let (file, path) = temp.into_parts();

        let mut staged = StagedUpload {
            body: Some(File::from_std(file)),
            path,
            size: 0,
        };

        let body = staged.body_mut()?;
        let size = tokio::io::copy(reader, body)
            .await
            .map_err(MediaError::Staging)?;
        body.flush().await.map_err(MediaError::Staging)?;
        body.seek(SeekFrom::Start(0))
            .await
            .map_err(MediaError::Staging)?;
        staged.size = size;

        debug!(path = %staged.path().display(), size, "Upload staged");
        Ok(staged)
    }
}

/// A fully written, rewound temporary file bound to one request
#[derive(Debug)]
pub struct StagedUpload {
    // Declared before `path` so the handle is closed before the unlink.
    body: Option<File>,
    path: TempPath,
    size: u64,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of bytes copied into the file
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Hand out the rewound read handle. The file itself stays guarded.
    pub fn take_body(&mut self) -> MediaResult<File> {
        self.body.take().ok_or_else(already_taken)
    }

    fn body_mut(&mut self) -> MediaResult<&mut File> {
        self.body.as_mut().ok_or_else(already_taken)
    }

    /// Delete the file now instead of at drop
    pub fn release(mut self) {
        drop(self.body.take());
        let path = self.path.to_path_buf();
        if let Err(e) = self.path.close() {
            warn!(path = %path.display(), error = %e, "Failed to remove staged upload");
        }
    }
}

fn already_taken() -> MediaError {
    MediaError::Staging(std::io::Error::other("staged body already taken"))
}
