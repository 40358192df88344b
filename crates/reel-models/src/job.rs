//! Batch job definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::caption::{normalize_caption, preview};
use crate::video::VideoMetadata;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Job lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Waiting to be picked up
    #[default]
    Pending,
    /// Being probed or encoded
    Processing,
    /// Encoder exited with code 0
    Completed,
    /// Dimension error, encoder failure or process fault
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// No further updates until the job is resubmitted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether `self -> next` is an allowed lifecycle edge.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Completed, Processing)
                | (Failed, Processing)
                | (Completed, Pending)
                | (Failed, Pending)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of a per-job failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Metadata query failed (non-fatal on its own)
    ProbeFailure,
    /// Width or height still unknown after probing
    DimensionUnknown,
    /// Encoder exited with a non-zero code
    EncodeFailure,
    /// Spawning or reading the external process faulted
    ProcessException,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::ProbeFailure => "probe_failure",
            FailureKind::DimensionUnknown => "dimension_unknown",
            FailureKind::EncodeFailure => "encode_failure",
            FailureKind::ProcessException => "process_exception",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rejected lifecycle edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid job transition {from} -> {to}")]
pub struct InvalidTransition {
    pub from: JobStatus,
    pub to: JobStatus,
}

/// One source-to-vertical conversion.
///
/// Status, error and output fields are only mutated by the batch queue
/// that owns the job list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoJob {
    pub id: JobId,
    source_path: PathBuf,
    caption: String,
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
    pub status: JobStatus,
    pub error_message: Option<String>,
    pub failure_kind: Option<FailureKind>,
    pub output_path: Option<PathBuf>,
    pub added_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl VideoJob {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            id: JobId::new(),
            source_path: source_path.into(),
            caption: String::new(),
            width: 0,
            height: 0,
            duration_secs: 0.0,
            status: JobStatus::Pending,
            error_message: None,
            failure_kind: None,
            output_path: None,
            added_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn with_caption(mut self, caption: &str) -> Self {
        self.set_caption(caption);
        self
    }

    pub fn with_metadata(mut self, meta: VideoMetadata) -> Self {
        self.set_metadata(meta);
        self
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Normalized caption text.
    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Replace the caption. The text is normalized on write.
    pub fn set_caption(&mut self, caption: &str) {
        self.caption = normalize_caption(caption);
    }

    pub fn has_caption(&self) -> bool {
        !self.caption.is_empty()
    }

    pub fn metadata(&self) -> VideoMetadata {
        VideoMetadata::new(self.width, self.height, self.duration_secs)
    }

    pub fn set_metadata(&mut self, meta: VideoMetadata) {
        self.width = meta.width;
        self.height = meta.height;
        self.duration_secs = meta.duration_secs;
    }

    pub fn has_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Move to `next`, stamping timestamps.
    pub fn transition(&mut self, next: JobStatus) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        match next {
            JobStatus::Pending => {
                self.error_message = None;
                self.failure_kind = None;
                self.output_path = None;
                self.started_at = None;
                self.finished_at = None;
            }
            JobStatus::Processing => {
                self.error_message = None;
                self.failure_kind = None;
                self.output_path = None;
                self.started_at = Some(Utc::now());
                self.finished_at = None;
            }
            JobStatus::Completed | JobStatus::Failed => {
                self.finished_at = Some(Utc::now());
            }
        }

        self.status = next;
        Ok(())
    }

    /// Move to `Failed` with a classified error.
    pub fn fail(
        &mut self,
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Result<(), InvalidTransition> {
        self.transition(JobStatus::Failed)?;
        self.failure_kind = Some(kind);
        self.error_message = Some(message.into());
        Ok(())
    }

    /// Source file name for display.
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source_path.to_string_lossy().into_owned())
    }

    /// `"WIDTHxHEIGHT"` or `"N/A"`.
    pub fn resolution_label(&self) -> String {
        if self.has_dimensions() {
            format!("{}x{}", self.width, self.height)
        } else {
            "N/A".to_string()
        }
    }

    /// `"MM:SS"` or `"N/A"`.
    pub fn duration_label(&self) -> String {
        if self.duration_secs > 0.0 {
            let total = self.duration_secs as u64;
            format!("{:02}:{:02}", total / 60, total % 60)
        } else {
            "N/A".to_string()
        }
    }

    pub fn caption_preview(&self, max_chars: usize) -> String {
        preview(&self.caption, max_chars)
    }
}
