//! One-shot conversion behind the `reel` binary.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

use reel_media::{build_filter_spec, ensure_parent_dir, EncodeRequest, FfmpegTranscoder, Transcoder};
use reel_models::{normalize_caption, FontChoice, OutputFormat, DEFAULT_FONT_FAMILY};

use crate::config::ReelConfig;

/// Convert one video to a 1080x1920 vertical reel.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "reel")]
#[command(version)]
#[command(about = "Convert one video to a 1080x1920 vertical reel")]
pub struct SingleArgs {
    /// Source video
    pub input: PathBuf,

    /// Destination file; missing parent directories are created
    pub output: PathBuf,

    /// Caption burned into the lower third
    #[arg(default_value = "")]
    pub caption: String,

    /// Caption font name
    #[arg(default_value = DEFAULT_FONT_FAMILY)]
    pub font: String,
}

impl SingleArgs {
    /// Lines printed before any work starts.
    pub fn preamble(&self) -> Vec<String> {
        let caption = normalize_caption(&self.caption);
        vec![
            format!("Processing: {}", self.input.display()),
            format!("Output: {}", self.output.display()),
            format!(
                "Caption: {}",
                if caption.is_empty() { "(none)" } else { caption.as_str() }
            ),
            format!("Font: {}", self.font),
        ]
    }
}

/// Format one progress line of the stdout protocol.
pub fn progress_line(percent: f64) -> String {
    format!("PROGRESS: {:.1}", percent)
}

/// Convert one file. Progress lines go to stdout as the encode runs.
///
/// Any returned error means the conversion failed; the caller reports it
/// and exits non-zero.
pub async fn run_single(args: &SingleArgs, config: &ReelConfig) -> anyhow::Result<()> {
    if !args.input.is_file() {
        bail!("Input file not found: {}", args.input.display());
    }

    let transcoder = FfmpegTranscoder::new(config.transcoder_settings());
    transcoder.check_available()?;

    ensure_parent_dir(&args.output)
        .await
        .context("Could not create output directory")?;

    for line in args.preamble() {
        println!("{}", line);
    }

    let meta = transcoder.probe(&args.input).await;
    if !meta.is_known() {
        bail!("Could not determine video dimensions");
    }
    info!(
        width = meta.width,
        height = meta.height,
        duration = meta.duration_secs,
        "Probed input"
    );

    let font = FontChoice::resolve(&args.font);
    let filter = build_filter_spec(
        meta.width,
        meta.height,
        &normalize_caption(&args.caption),
        &font,
        &OutputFormat::vertical(),
    )?;
    println!("Video filter: {}", filter.to_filter_string());

    let request = EncodeRequest::new(&args.input, &args.output, filter, meta.duration_secs);
    transcoder
        .encode(&request, Box::new(|pct| println!("{}", progress_line(pct))))
        .await
        .map_err(|e| anyhow::anyhow!("FFmpeg failed:\n{}", e.job_message()))?;

    Ok(())
}
