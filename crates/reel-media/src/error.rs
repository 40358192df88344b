//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

use reel_models::{EncodingConfigError, FailureKind};

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found: {0}")]
    FfmpegNotFound(String),

    #[error("FFprobe not found: {0}")]
    FfprobeNotFound(String),

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Could not determine video dimensions ({width}x{height})")]
    DimensionUnknown { width: u32, height: u32 },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("Invalid encoding configuration: {0}")]
    InvalidConfig(#[from] EncodingConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create an FFprobe failure error.
    pub fn ffprobe_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::FfprobeFailed {
            message: message.into(),
            stderr,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Diagnostic tail captured from the encoder, if any.
    pub fn diagnostic_tail(&self) -> Option<&str> {
        match self {
            Self::FfmpegFailed { stderr, .. } | Self::FfprobeFailed { stderr, .. } => {
                stderr.as_deref()
            }
            _ => None,
        }
    }

    /// Map onto the per-job failure taxonomy.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::FfprobeNotFound(_)
            | Self::FfprobeFailed { .. }
            | Self::JsonParse(_)
            | Self::InvalidVideo(_) => FailureKind::ProbeFailure,
            Self::DimensionUnknown { .. } => FailureKind::DimensionUnknown,
            Self::FfmpegFailed { .. } | Self::Timeout(_) => FailureKind::EncodeFailure,
            Self::FfmpegNotFound(_)
            | Self::FileNotFound(_)
            | Self::InvalidConfig(_)
            | Self::Io(_)
            | Self::Internal(_) => FailureKind::ProcessException,
        }
    }

    /// Message suitable for a job's error field: the error plus the
    /// encoder's diagnostic tail when one was captured.
    pub fn job_message(&self) -> String {
        match self.diagnostic_tail() {
            Some(tail) if !tail.trim().is_empty() => format!("{}\n{}", self, tail.trim_end()),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kinds() {
        assert_eq!(
            MediaError::DimensionUnknown { width: 0, height: 0 }.failure_kind(),
            FailureKind::DimensionUnknown
        );
        assert_eq!(
            MediaError::ffmpeg_failed("x", None, Some(1)).failure_kind(),
            FailureKind::EncodeFailure
        );
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        assert_eq!(MediaError::from(io).failure_kind(), FailureKind::ProcessException);
        assert_eq!(MediaError::Timeout(30).failure_kind(), FailureKind::EncodeFailure);
    }

    #[test]
    fn test_job_message_includes_tail() {
        let err = MediaError::ffmpeg_failed(
            "FFmpeg exited with code 1",
            Some("line a\nInvalid argument\n".to_string()),
            Some(1),
        );
        let msg = err.job_message();
        assert!(msg.starts_with("FFmpeg command failed: FFmpeg exited with code 1"));
        assert!(msg.ends_with("Invalid argument"));

        let plain = MediaError::DimensionUnknown { width: 0, height: 0 };
        assert_eq!(plain.job_message(), plain.to_string());
    }
}
