//! Shared data models for the vertical reel converter.
//!
//! This crate provides Serde-serializable types for:
//! - Batch jobs and their lifecycle status
//! - Probed video metadata
//! - The fixed output canvas and caption styling
//! - Encoding configuration
//! - Caption font selection

pub mod caption;
pub mod encoding;
pub mod font;
pub mod format;
pub mod job;
pub mod video;

// Re-export common types
pub use caption::normalize_caption;
pub use encoding::{EncodingConfig, EncodingConfigError, RateControl};
pub use font::{FontChoice, DEFAULT_FONT_FAMILY};
pub use format::OutputFormat;
pub use job::{FailureKind, InvalidTransition, JobId, JobStatus, VideoJob};
pub use video::VideoMetadata;
