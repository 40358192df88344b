//! Probed video metadata.

use serde::{Deserialize, Serialize};

/// Width, height and duration of a source video.
///
/// A zero value means "unknown". The default value is the all-zero result
/// returned when probing fails.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Container duration in seconds
    pub duration_secs: f64,
}

impl VideoMetadata {
    pub fn new(width: u32, height: u32, duration_secs: f64) -> Self {
        Self {
            width,
            height,
            duration_secs,
        }
    }

    /// Both dimensions are known.
    pub fn is_known(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}
