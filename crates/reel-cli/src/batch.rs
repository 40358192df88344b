//! Multi-file conversion behind the `reel-batch` binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use reel_media::FfmpegTranscoder;
use reel_models::{FontChoice, JobStatus, DEFAULT_FONT_FAMILY};
use reel_queue::{BatchQueue, BatchSettings, BatchSummary, QueueEvent};

use crate::config::ReelConfig;

/// Convert many videos into one output directory.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "reel-batch")]
#[command(version)]
#[command(about = "Convert many videos to 1080x1920 vertical reels")]
pub struct BatchArgs {
    /// Directory receiving `<stem>_out.mp4` files
    pub output_dir: PathBuf,

    /// Source videos; repeated paths are queued once
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Caption applied to every queued video
    #[arg(long, env = "REEL_CAPTION", default_value = "")]
    pub caption: String,

    /// Caption font name
    #[arg(long, env = "REEL_FONT", default_value = DEFAULT_FONT_FAMILY)]
    pub font: String,
}

/// Output stream for a rendered event line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Render an event as a protocol line.
pub fn describe_event(event: &QueueEvent) -> (Stream, String) {
    match event {
        QueueEvent::JobStarted {
            position,
            total,
            source,
            ..
        } => (
            Stream::Stdout,
            format!("[{}/{}] Processing: {}", position + 1, total, source.display()),
        ),
        QueueEvent::Progress { percent, .. } => {
            (Stream::Stdout, format!("PROGRESS: {:.1}", percent))
        }
        QueueEvent::JobFinished { job } if job.status == JobStatus::Completed => {
            let output = job
                .output_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            (
                Stream::Stdout,
                format!("SUCCESS: {} -> {}", job.file_name(), output),
            )
        }
        QueueEvent::JobFinished { job } => (
            Stream::Stderr,
            format!(
                "FAILED: {}: {}",
                job.file_name(),
                job.error_message.as_deref().unwrap_or("unknown error")
            ),
        ),
        QueueEvent::BatchFinished { summary } => (
            Stream::Stdout,
            format!(
                "Batch complete: {} completed, {} failed",
                summary.completed, summary.failed
            ),
        ),
    }
}

/// Queue every input, run the batch and print its events.
///
/// Errors are top-level failures; per-job failures only show up in the
/// returned summary.
pub async fn run_batch(args: &BatchArgs, config: &ReelConfig) -> anyhow::Result<BatchSummary> {
    let transcoder = Arc::new(FfmpegTranscoder::new(config.transcoder_settings()));

    let mut queue = BatchQueue::new();
    let added = queue.add_videos(args.inputs.iter().cloned());
    if added.len() < args.inputs.len() {
        info!(skipped = args.inputs.len() - added.len(), "Skipped duplicate inputs");
    }
    queue.apply_bulk_caption(&args.caption);

    let settings = BatchSettings::new(&args.output_dir)
        .with_font(FontChoice::resolve(&args.font))
        .with_event_capacity(config.event_capacity);

    let run = queue
        .start(transcoder, settings)
        .await
        .map_err(|e| e.error)
        .context("Batch could not start")?;

    let (_, summary) = run
        .drain(|event| match describe_event(&event) {
            (Stream::Stdout, line) => println!("{}", line),
            (Stream::Stderr, line) => eprintln!("{}", line),
        })
        .await?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_models::{FailureKind, JobId, VideoJob};

    fn parse(list: &[&str]) -> Result<BatchArgs, clap::Error> {
        BatchArgs::try_parse_from(std::iter::once("reel-batch").chain(list.iter().copied()))
    }

    #[test]
    fn test_parse() {
        let args = parse(&[
            "out",
            "a.mp4",
            "b.mp4",
            "--caption",
            "Watch this",
            "--font",
            "Bebas-Neue",
        ])
        .unwrap();
        assert_eq!(args.output_dir, PathBuf::from("out"));
        assert_eq!(
            args.inputs,
            vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")]
        );
        assert_eq!(args.caption, "Watch this");
        assert_eq!(args.font, "Bebas-Neue");
    }

    #[test]
    fn test_parse_defaults() {
        let bare = BatchArgs::try_parse_from(["reel-batch", "out", "a.mp4"]).unwrap();
        assert_eq!(bare.inputs, vec![PathBuf::from("a.mp4")]);
        // The environment may set REEL_CAPTION/REEL_FONT; explicit flags win
        let flagged =
            parse(&["--caption", "", "--font", "Impact", "out", "a.mp4"]).unwrap();
        assert_eq!(flagged.caption, "");
        assert_eq!(flagged.font, "Impact");
    }

    #[test]
    fn test_parse_requires_inputs() {
        assert!(parse(&[]).is_err());
        let err = parse(&["out"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_describe_events() {
        let id = JobId::new();
        let (stream, line) = describe_event(&QueueEvent::JobStarted {
            job_id: id.clone(),
            position: 0,
            total: 2,
            source: PathBuf::from("a.mp4"),
        });
        assert_eq!(stream, Stream::Stdout);
        assert_eq!(line, "[1/2] Processing: a.mp4");

        let (_, line) = describe_event(&QueueEvent::Progress {
            job_id: id,
            percent: 47.26,
        });
        assert_eq!(line, "PROGRESS: 47.3");

        let mut job = VideoJob::new("b.mp4");
        job.transition(JobStatus::Processing).unwrap();
        job.fail(FailureKind::DimensionUnknown, "no size").unwrap();
        let (stream, line) = describe_event(&QueueEvent::JobFinished { job: Box::new(job) });
        assert_eq!(stream, Stream::Stderr);
        assert_eq!(line, "FAILED: b.mp4: no size");

        let (_, line) = describe_event(&QueueEvent::BatchFinished {
            summary: BatchSummary {
                total: 2,
                completed: 1,
                failed: 1,
            },
        });
        assert_eq!(line, "Batch complete: 1 completed, 1 failed");
    }
}
