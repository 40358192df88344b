//! Vertical re-encode of a single source.

use std::path::{Path, PathBuf};
use tracing::info;

use reel_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::FilterSpec;

/// Everything the encoder needs for one output.
#[derive(Debug, Clone)]
pub struct EncodeRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub filter: FilterSpec,
    /// Source duration in seconds (0 when unknown; disables percentages)
    pub duration_secs: f64,
}

impl EncodeRequest {
    pub fn new(
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        filter: FilterSpec,
        duration_secs: f64,
    ) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            filter,
            duration_secs,
        }
    }
}

/// Build the full encoder command for a request.
pub fn build_encode_command(
    request: &EncodeRequest,
    encoding: &EncodingConfig,
) -> MediaResult<FfmpegCommand> {
    encoding.validate()?;

    Ok(FfmpegCommand::new(&request.input, &request.output)
        .video_filter(request.filter.to_filter_string())
        .output_args(encoding.to_ffmpeg_args()))
}

/// Encode `request.input` into the vertical format at `request.output`,
/// overwriting any existing file.
pub async fn encode_vertical<F>(
    request: &EncodeRequest,
    encoding: &EncodingConfig,
    runner: &FfmpegRunner,
    progress_callback: F,
) -> MediaResult<()>
where
    F: Fn(f64) + Send + 'static,
{
    if !request.input.exists() {
        return Err(MediaError::FileNotFound(request.input.clone()));
    }

    info!(
        "Encoding vertical: {} -> {}",
        request.input.display(),
        request.output.display()
    );
    info!("Video filter: {}", request.filter.to_filter_string());

    let cmd = build_encode_command(request, encoding)?;
    runner
        .run_with_progress(&cmd, request.duration_secs, progress_callback)
        .await?;

    info!("Encoded: {}", request.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::build_filter_spec;
    use reel_models::{FontChoice, OutputFormat, RateControl};

    fn request() -> EncodeRequest {
        let filter = build_filter_spec(
            1920,
            1080,
            "Hi",
            &FontChoice::default(),
            &OutputFormat::vertical(),
        )
        .unwrap();
        EncodeRequest::new("in.mp4", "out/in_out.mp4", filter, 10.0)
    }

    #[test]
    fn test_encode_command_shape() {
        let args = build_encode_command(&request(), &EncodingConfig::default())
            .unwrap()
            .build_args();

        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert!(args[vf + 1].starts_with("scale=3414:1920:flags=lanczos,crop=1080:1920:1167:0,drawtext="));
        assert!(args.windows(2).any(|w| w == ["-pix_fmt", "yuv420p"]));
        assert!(args.windows(2).any(|w| w == ["-ar", "44100"]));
        assert!(args.windows(2).any(|w| w == ["-c:a", "aac"]));
        assert!(args.windows(2).any(|w| w == ["-crf", "23"]));
        assert!(!args.iter().any(|a| a == "-b:v" || a == "-maxrate"));
        assert_eq!(args.last().unwrap(), "out/in_out.mp4");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let encoding = EncodingConfig {
            rate_control: RateControl::Crf(23),
            extra_args: vec!["-b:v".to_string(), "6M".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            build_encode_command(&request(), &encoding),
            Err(MediaError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_input() {
        let err = encode_vertical(
            &request(),
            &EncodingConfig::default(),
            &FfmpegRunner::new(),
            |_| {},
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
