#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for vertical reel conversion.
//!
//! This crate provides:
//! - Video probing with a bounded timeout
//! - Scale/crop/caption filter chain construction
//! - Type-safe FFmpeg command building and execution
//! - Progress parsing from the encoder's diagnostic stream
//! - Collision-free output naming
//! - A `Transcoder` seam for the batch queue

pub mod command;
pub mod encode;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod probe;
pub mod progress;
pub mod transcoder;

pub use command::{FfmpegCommand, FfmpegRunner, DEFAULT_FFMPEG, DEFAULT_FFPROBE};
pub use encode::{build_encode_command, encode_vertical, EncodeRequest};
pub use error::{MediaError, MediaResult};
pub use filters::{
    build_caption_overlay, build_filter_spec, escape_drawtext, font_size_for, plan_scale,
    FilterSpec, FixedAxis, ScalePlan,
};
pub use fs_utils::{ensure_output_dir, ensure_parent_dir, output_file_name, resolve_output_path};
pub use probe::{Prober, VideoInfo, DEFAULT_PROBE_TIMEOUT};
pub use progress::{
    parse_timestamp_seconds, ProgressCallback, ProgressTracker, COMPLETE_PROGRESS,
};
pub use transcoder::{FfmpegTranscoder, Transcoder, TranscoderSettings};
