//! Video encoding configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default encoding preset
pub const DEFAULT_PRESET: &str = "medium";
/// Default CRF (Constant Rate Factor)
pub const DEFAULT_CRF: u8 = 23;
/// Default audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";
/// Default audio sample rate
pub const DEFAULT_AUDIO_SAMPLE_RATE: u32 = 44_100;
/// Output pixel format (4:2:0)
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";

/// Flags that select a video rate-control mode.
const RATE_CONTROL_FLAGS: &[&str] = &["-b:v", "-maxrate", "-bufsize", "-crf", "-cq", "-qp"];

/// Video rate control. One mode per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "value")]
pub enum RateControl {
    /// Constant Rate Factor (quality, 0-51, lower is better)
    Crf(u8),
    /// Target bitrate (e.g. "6M")
    Bitrate(String),
}

impl Default for RateControl {
    fn default() -> Self {
        RateControl::Crf(DEFAULT_CRF)
    }
}

/// Rejected encoding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingConfigError {
    #[error("extra argument {0} conflicts with the configured rate control")]
    MixedRateControl(String),

    #[error("pixel format {0} is not 4:2:0")]
    UnsupportedPixelFormat(String),

    #[error("CRF {0} is out of range (0-51)")]
    CrfOutOfRange(u8),
}

/// Video encoding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Video codec (e.g., "libx264")
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Encoding preset (e.g., "fast", "medium", "slow")
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Video rate control
    #[serde(default)]
    pub rate_control: RateControl,

    /// Audio codec
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Audio bitrate
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    /// Audio sample rate in Hz
    #[serde(default = "default_audio_sample_rate")]
    pub audio_sample_rate: u32,

    /// Output pixel format
    #[serde(default = "default_pixel_format")]
    pub pixel_format: String,

    /// Move the MP4 index to the front for progressive playback
    #[serde(default = "default_faststart")]
    pub faststart: bool,

    /// Additional FFmpeg output arguments
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}
fn default_audio_bitrate() -> String {
    DEFAULT_AUDIO_BITRATE.to_string()
}
fn default_audio_sample_rate() -> u32 {
    DEFAULT_AUDIO_SAMPLE_RATE
}
fn default_pixel_format() -> String {
    DEFAULT_PIXEL_FORMAT.to_string()
}
fn default_faststart() -> bool {
    true
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: DEFAULT_PRESET.to_string(),
            rate_control: RateControl::default(),
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            audio_sample_rate: DEFAULT_AUDIO_SAMPLE_RATE,
            pixel_format: DEFAULT_PIXEL_FORMAT.to_string(),
            faststart: true,
            extra_args: Vec::new(),
        }
    }
}

impl EncodingConfig {
    /// Create a new encoding configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new config with updated CRF.
    pub fn with_crf(mut self, crf: u8) -> Self {
        self.rate_control = RateControl::Crf(crf);
        self
    }

    /// Returns a new config with updated preset.
    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = preset.into();
        self
    }

    /// Check the configuration before it reaches the encoder.
    pub fn validate(&self) -> Result<(), EncodingConfigError> {
        if let RateControl::Crf(crf) = self.rate_control {
            if crf > 51 {
                return Err(EncodingConfigError::CrfOutOfRange(crf));
            }
        }

        if let Some(flag) = self
            .extra_args
            .iter()
            .find(|arg| RATE_CONTROL_FLAGS.contains(&arg.as_str()))
        {
            return Err(EncodingConfigError::MixedRateControl(flag.clone()));
        }

        if !self.pixel_format.starts_with("yuv420p") && self.pixel_format != "nv12" {
            return Err(EncodingConfigError::UnsupportedPixelFormat(
                self.pixel_format.clone(),
            ));
        }

        Ok(())
    }

    /// Convert to FFmpeg output arguments.
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        let mut args = vec![
            "-c:v".to_string(),
            self.codec.clone(),
            "-preset".to_string(),
            self.preset.clone(),
        ];

        match &self.rate_control {
            RateControl::Crf(crf) => {
                args.extend_from_slice(&["-crf".to_string(), crf.to_string()]);
            }
            RateControl::Bitrate(bitrate) => {
                args.extend_from_slice(&["-b:v".to_string(), bitrate.clone()]);
            }
        }

        args.extend_from_slice(&[
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-b:a".to_string(),
            self.audio_bitrate.clone(),
            "-ar".to_string(),
            self.audio_sample_rate.to_string(),
            "-pix_fmt".to_string(),
            self.pixel_format.clone(),
        ]);

        if self.faststart {
            args.extend_from_slice(&["-movflags".to_string(), "+faststart".to_string()]);
        }

        args.extend(self.extra_args.clone());

        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EncodingConfig::default();
        assert_eq!(config.codec, "libx264");
        assert_eq!(config.rate_control, RateControl::Crf(23));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ffmpeg_args() {
        let args = EncodingConfig::default().to_ffmpeg_args();
        let joined = args.join(" ");
        assert!(joined.contains("-c:v libx264"));
        assert!(joined.contains("-crf 23"));
        assert!(joined.contains("-c:a aac"));
        assert!(joined.contains("-ar 44100"));
        assert!(joined.contains("-pix_fmt yuv420p"));
        assert!(joined.contains("-movflags +faststart"));
        assert!(!joined.contains("-b:v"));
        assert!(!joined.contains("-maxrate"));
    }

    #[test]
    fn test_bitrate_mode_has_no_crf() {
        let config = EncodingConfig {
            rate_control: RateControl::Bitrate("6M".to_string()),
            ..Default::default()
        };
        let args = config.to_ffmpeg_args();
        assert!(args.contains(&"-b:v".to_string()));
        assert!(!args.contains(&"-crf".to_string()));
    }

    #[test]
    fn test_mixed_rate_control_rejected() {
        let config = EncodingConfig {
            extra_args: vec!["-maxrate".to_string(), "6M".to_string()],
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(EncodingConfigError::MixedRateControl("-maxrate".to_string()))
        );
    }

    #[test]
    fn test_non_420_rejected() {
        let config = EncodingConfig {
            pixel_format: "yuv444p".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EncodingConfigError::UnsupportedPixelFormat(_))
        ));
    }

    #[test]
    fn test_crf_range() {
        assert!(EncodingConfig::default().with_crf(52).validate().is_err());
        assert!(EncodingConfig::default().with_crf(18).validate().is_ok());
    }
}
