//! FFprobe video information.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use reel_models::VideoMetadata;

use crate::command::DEFAULT_FFPROBE;
use crate::error::{MediaError, MediaResult};

/// Upper bound on a single probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Video file information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Video codec
    pub codec: String,
}

impl VideoInfo {
    pub fn metadata(&self) -> VideoMetadata {
        VideoMetadata::new(self.width, self.height, self.duration)
    }
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Prober bound to an executable and a timeout.
#[derive(Debug, Clone)]
pub struct Prober {
    binary: String,
    timeout: Duration,
}

impl Default for Prober {
    fn default() -> Self {
        Self::new()
    }
}

impl Prober {
    pub fn new() -> Self {
        Self {
            binary: DEFAULT_FFPROBE.to_string(),
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Use a specific prober executable.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Probe a video file for information.
    pub async fn probe_video(&self, path: impl AsRef<Path>) -> MediaResult<VideoInfo> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }

        let binary = which::which(&self.binary)
            .map_err(|_| MediaError::FfprobeNotFound(self.binary.clone()))?;

        let child = Command::new(binary)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Dropping the pending future on timeout kills the child
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| MediaError::Timeout(self.timeout.as_secs()))??;

        if !output.status.success() {
            return Err(MediaError::ffprobe_failed(
                format!("FFprobe exited with {}", output.status),
                Some(String::from_utf8_lossy(&output.stderr).to_string()),
            ));
        }

        parse_probe_output(&output.stdout)
    }

    /// Probe a file, returning zero metadata on any failure.
    ///
    /// Failures are logged rather than returned: a job with unknown
    /// dimensions is rejected later by the caller.
    pub async fn probe_metadata(&self, path: impl AsRef<Path>) -> VideoMetadata {
        let path = path.as_ref();
        match self.probe_video(path).await {
            Ok(info) => {
                debug!(
                    path = %path.display(),
                    width = info.width,
                    height = info.height,
                    duration = info.duration,
                    "Probed video"
                );
                info.metadata()
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    kind = %e.failure_kind(),
                    "Failed to get video info: {}", e
                );
                VideoMetadata::default()
            }
        }
    }
}

/// Parse ffprobe JSON, taking the first video stream.
fn parse_probe_output(stdout: &[u8]) -> MediaResult<VideoInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| MediaError::InvalidVideo("No video stream found".to_string()))?;

    let duration = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or(0.0);

    Ok(VideoInfo {
        duration,
        width: video_stream.width.unwrap_or(0),
        height: video_stream.height.unwrap_or(0),
        codec: video_stream.codec_name.clone().unwrap_or_default(),
    })
}
