//! Orientation classification of staged media
//!
//! The dimensions come from an external prober (ffprobe by default); the
//! width/height pair is reduced by its greatest common divisor and the reduced
//! ratio decides the orientation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{error, info};

use crate::error::{MediaError, MediaResult};

/// Coarse geometric category of a video
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
    /// Square, or a ratio that could not be decided
    Other,
}

impl Orientation {
    /// Label used as the storage key prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
            Orientation::Other => "other",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel dimensions of the first video stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width and height divided by their greatest common divisor
    pub fn reduced(&self) -> (u32, u32) {
        let divisor = gcd(self.width, self.height);
        if divisor == 0 {
            return (self.width, self.height);
        }
        (self.width / divisor, self.height / divisor)
    }

    pub fn orientation(&self) -> Orientation {
        let (ratio_width, ratio_height) = self.reduced();
        match ratio_width.cmp(&ratio_height) {
            std::cmp::Ordering::Less => Orientation::Portrait,
            std::cmp::Ordering::Greater => Orientation::Landscape,
            std::cmp::Ordering::Equal => Orientation::Other,
        }
    }
}

/// Iterative Euclid; `gcd(a, 0) == a`
pub fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Capability to read the dimensions of a fully staged media file.
///
/// Implementations must only be called once the file has been completely
/// written and flushed.
#[async_trait]
pub trait MediaProber: Send + Sync {
    async fn dimensions(&self, path: &Path) -> MediaResult<Dimensions>;

    async fn classify(&self, path: &Path) -> MediaResult<Orientation> {
        let dimensions = self.dimensions(path).await?;
        Ok(dimensions.orientation())
    }
}

/// Runs `ffprobe` as a subprocess and reads its JSON stream report
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    program: PathBuf,
}

impl FfprobeProber {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    async fn dimensions(&self, path: &Path) -> MediaResult<Dimensions> {
        info!("Probing media file: {}", path.display());

        let output = Command::new(&self.program)
            .arg("-v")
            .arg("error")
            .arg("-select_streams")
            .arg("v:0")
            .arg("-print_format")
            .arg("json")
            .arg("-show_streams")
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                MediaError::Probe(format!(
                    "failed to run {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("ffprobe failed with status {:?}: {}", output.status, stderr.trim());
            return Err(MediaError::Probe(format!(
                "ffprobe exited with {}",
                output.status
            )));
        }

        parse_probe_report(&output.stdout)
    }
}

#[derive(Debug, Deserialize)]
struct ProbeReport {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Extract the first stream's dimensions from an ffprobe JSON report
pub fn parse_probe_report(raw: &[u8]) -> MediaResult<Dimensions> {
    let report: ProbeReport = serde_json::from_slice(raw)
        .map_err(|e| MediaError::Probe(format!("malformed ffprobe output: {}", e)))?;

    let stream = report
        .streams
        .first()
        .ok_or_else(|| MediaError::Probe("no video stream found".to_string()))?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => {
            Ok(Dimensions::new(width, height))
        }
        _ => Err(MediaError::Probe(
            "first stream has no usable width/height".to_string(),
        )),
    }
}
