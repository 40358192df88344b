//! CLI configuration.

use std::time::Duration;

use reel_media::{TranscoderSettings, DEFAULT_FFMPEG, DEFAULT_FFPROBE, DEFAULT_PROBE_TIMEOUT};
use reel_models::EncodingConfig;
use reel_queue::DEFAULT_EVENT_CAPACITY;

/// Tool locations, timeouts and encoder overrides.
#[derive(Debug, Clone)]
pub struct ReelConfig {
    /// ffmpeg executable name or path
    pub ffmpeg: String,
    /// ffprobe executable name or path
    pub ffprobe: String,
    pub probe_timeout: Duration,
    /// Unset or 0 disables the encode timeout
    pub encode_timeout: Option<Duration>,
    /// Batch event channel capacity
    pub event_capacity: usize,
    pub encoding: EncodingConfig,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            ffmpeg: DEFAULT_FFMPEG.to_string(),
            ffprobe: DEFAULT_FFPROBE.to_string(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            encode_timeout: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            encoding: EncodingConfig::default(),
        }
    }
}

impl ReelConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable source. Unparseable values
    /// fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());

        let mut encoding = EncodingConfig::default();
        if let Some(crf) = lookup("REEL_CRF").and_then(|s| s.trim().parse::<u8>().ok()) {
            encoding = encoding.with_crf(crf);
        }
        if let Some(preset) = lookup("REEL_PRESET").filter(|s| !s.trim().is_empty()) {
            encoding = encoding.with_preset(preset.trim());
        }

        Self {
            ffmpeg: lookup("REEL_FFMPEG").unwrap_or_else(|| DEFAULT_FFMPEG.to_string()),
            ffprobe: lookup("REEL_FFPROBE").unwrap_or_else(|| DEFAULT_FFPROBE.to_string()),
            probe_timeout: parsed("REEL_PROBE_TIMEOUT_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_PROBE_TIMEOUT),
            encode_timeout: parsed("REEL_ENCODE_TIMEOUT_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            event_capacity: parsed("REEL_EVENT_CAPACITY")
                .map(|n| n as usize)
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_EVENT_CAPACITY),
            encoding,
        }
    }

    pub fn transcoder_settings(&self) -> TranscoderSettings {
        TranscoderSettings {
            ffmpeg: self.ffmpeg.clone(),
            ffprobe: self.ffprobe.clone(),
            probe_timeout: self.probe_timeout,
            encode_timeout: self.encode_timeout,
            encoding: self.encoding.clone(),
        }
    }
}
