//! Transcoder abstraction used by the batch queue.
//!
//! The queue only needs three things from the outside world: is the encoder
//! there, what are a file's dimensions, and encode this request. Keeping them
//! behind a trait lets the queue run against a scripted fake in tests.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use reel_models::{EncodingConfig, VideoMetadata};

use crate::command::{FfmpegRunner, DEFAULT_FFMPEG, DEFAULT_FFPROBE};
use crate::encode::{encode_vertical, EncodeRequest};
use crate::error::MediaResult;
use crate::probe::{Prober, DEFAULT_PROBE_TIMEOUT};
use crate::progress::ProgressCallback;

/// External prober/encoder pair.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Fail fast if the encoder cannot run at all.
    fn check_available(&self) -> MediaResult<()>;

    /// Probe a source. Never fails: unknown values are zero.
    async fn probe(&self, path: &Path) -> VideoMetadata;

    /// Encode one request, reporting percentages through `progress`.
    async fn encode(&self, request: &EncodeRequest, progress: ProgressCallback) -> MediaResult<()>;
}

/// Settings for [`FfmpegTranscoder`].
#[derive(Debug, Clone)]
pub struct TranscoderSettings {
    pub ffmpeg: String,
    pub ffprobe: String,
    pub probe_timeout: Duration,
    /// `None` lets an encode run until the process exits
    pub encode_timeout: Option<Duration>,
    pub encoding: EncodingConfig,
}

impl Default for TranscoderSettings {
    fn default() -> Self {
        Self {
            ffmpeg: DEFAULT_FFMPEG.to_string(),
            ffprobe: DEFAULT_FFPROBE.to_string(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            encode_timeout: None,
            encoding: EncodingConfig::default(),
        }
    }
}

/// [`Transcoder`] backed by the ffmpeg/ffprobe executables.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    prober: Prober,
    runner: FfmpegRunner,
    encoding: EncodingConfig,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new(TranscoderSettings::default())
    }
}

impl FfmpegTranscoder {
    pub fn new(settings: TranscoderSettings) -> Self {
        let prober = Prober::new()
            .with_binary(settings.ffprobe)
            .with_timeout(settings.probe_timeout);

        let mut runner = FfmpegRunner::new().with_binary(settings.ffmpeg);
        if let Some(timeout) = settings.encode_timeout {
            runner = runner.with_timeout(timeout.as_secs().max(1));
        }

        Self {
            prober,
            runner,
            encoding: settings.encoding,
        }
    }

    pub fn encoding(&self) -> &EncodingConfig {
        &self.encoding
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn check_available(&self) -> MediaResult<()> {
        self.runner.check()?;
        self.encoding.validate()?;
        Ok(())
    }

    async fn probe(&self, path: &Path) -> VideoMetadata {
        self.prober.probe_metadata(path).await
    }

    async fn encode(&self, request: &EncodeRequest, progress: ProgressCallback) -> MediaResult<()> {
        encode_vertical(request, &self.encoding, &self.runner, progress).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MediaError;

    #[test]
    fn test_missing_encoder_detected() {
        let transcoder = FfmpegTranscoder::new(TranscoderSettings {
            ffmpeg: "no-such-ffmpeg-here".to_string(),
            ..Default::default()
        });
        assert!(matches!(
            transcoder.check_available(),
            Err(MediaError::FfmpegNotFound(_))
        ));
    }
}
