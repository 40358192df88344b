//! FFmpeg command builder and runner.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};
use crate::progress::ProgressTracker;

/// Default encoder executable.
pub const DEFAULT_FFMPEG: &str = "ffmpeg";
/// Default prober executable.
pub const DEFAULT_FFPROBE: &str = "ffprobe";
/// Diagnostic lines kept for failure reports.
pub const DIAGNOSTIC_TAIL_LINES: usize = 10;
/// Errors only; progress arrives through `-progress`.
const FFMPEG_LOG_LEVEL: &str = "error";

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
        }
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Keep an existing output instead of overwriting it.
    pub fn no_overwrite(mut self) -> Self {
        self.overwrite = false;
        self
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        args.push(if self.overwrite { "-y" } else { "-n" }.to_string());
        args.push("-nostdin".to_string());

        args.push("-v".to_string());
        args.push(FFMPEG_LOG_LEVEL.to_string());

        // Progress output to stderr
        args.push("-progress".to_string());
        args.push("pipe:2".to_string());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.clone());

        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// What the stderr reader hands back once the stream closes.
struct DiagnosticStream<F> {
    progress_callback: F,
    tracker: ProgressTracker,
    tail: VecDeque<String>,
}

/// Runner for FFmpeg commands with progress tracking.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    /// Encoder executable name or path
    binary: String,
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self {
            binary: DEFAULT_FFMPEG.to_string(),
            timeout_secs: None,
        }
    }

    /// Use a specific encoder executable.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Resolve the encoder executable.
    pub fn check(&self) -> MediaResult<PathBuf> {
        which::which(&self.binary).map_err(|_| MediaError::FfmpegNotFound(self.binary.clone()))
    }

    /// Run an FFmpeg command, reporting percentages against
    /// `total_duration_secs`.
    ///
    /// The callback sees strictly increasing values capped at 95 while the
    /// process runs, then a single 100 after a zero exit code.
    pub async fn run_with_progress<F>(
        &self,
        cmd: &FfmpegCommand,
        total_duration_secs: f64,
        progress_callback: F,
    ) -> MediaResult<()>
    where
        F: Fn(f64) + Send + 'static,
    {
        let binary = self.check()?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: {} {}", binary.display(), args.join(" "));

        let mut child = Command::new(&binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MediaError::internal("stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::internal("stderr not captured"))?;

        // Nothing useful arrives on stdout; drain it so the pipe never fills
        let stdout_handle = tokio::spawn(async move {
            let mut sink = Vec::new();
            let _ = BufReader::new(stdout).read_to_end(&mut sink).await;
            sink.len()
        });

        // Spawn progress parsing task
        let stderr_handle = tokio::spawn(async move {
            let mut stream = DiagnosticStream {
                progress_callback,
                tracker: ProgressTracker::new(total_duration_secs),
                tail: VecDeque::with_capacity(DIAGNOSTIC_TAIL_LINES),
            };
            let mut reader = BufReader::new(stderr);
            let mut buf = Vec::new();

            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Stopped reading FFmpeg stderr: {}", e);
                        break;
                    }
                }
                // Paths quoted in error lines are not always UTF-8
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\r', '\n']);

                if let Some(pct) = stream.tracker.observe(line) {
                    (stream.progress_callback)(pct);
                }
                if is_diagnostic_line(line) {
                    if stream.tail.len() == DIAGNOSTIC_TAIL_LINES {
                        stream.tail.pop_front();
                    }
                    stream.tail.push_back(line.to_string());
                }
            }

            stream
        });

        let status = self.wait_for_completion(&mut child).await;
        if status.is_err() {
            // Unblock the readers if the process is somehow still alive
            let _ = child.start_kill();
        }

        let mut stream = stderr_handle
            .await
            .map_err(|e| MediaError::internal(format!("stderr reader panicked: {}", e)))?;
        if let Ok(bytes) = stdout_handle.await {
            if bytes > 0 {
                debug!(bytes, "Discarded FFmpeg stdout");
            }
        }

        let status = status?;

        if status.success() {
            if let Some(pct) = stream.tracker.complete() {
                (stream.progress_callback)(pct);
            }
            Ok(())
        } else {
            let tail = stream.tail.into_iter().collect::<Vec<_>>().join("\n");
            let message = match status.code() {
                Some(code) => format!("FFmpeg exited with code {}", code),
                None => "FFmpeg terminated by signal".to_string(),
            };
            Err(MediaError::ffmpeg_failed(message, Some(tail), status.code()))
        }
    }

    /// Wait for child process with optional timeout.
    async fn wait_for_completion(
        &self,
        child: &mut Child,
    ) -> MediaResult<std::process::ExitStatus> {
        let Some(timeout_secs) = self.timeout_secs else {
            return Ok(child.wait().await?);
        };

        match tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait()).await {
            Ok(status) => Ok(status?),
            Err(_) => {
                warn!("FFmpeg timed out after {} seconds, killing process", timeout_secs);
                let _ = child.kill().await;
                Err(MediaError::Timeout(timeout_secs))
            }
        }
    }
}

/// `-progress` key/value lines carry no diagnostic value for failure reports.
fn is_diagnostic_line(line: &str) -> bool {
    const PROGRESS_KEYS: &[&str] = &[
        "frame", "fps", "stream_", "bitrate", "total_size", "out_time", "dup_frames",
        "drop_frames", "speed", "progress",
    ];

    let line = line.trim();
    if line.is_empty() {
        return false;
    }
    match line.split_once('=') {
        Some((key, _)) if !key.contains(' ') => {
            !PROGRESS_KEYS.iter().any(|prefix| key.starts_with(prefix))
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = FfmpegCommand::new("input.mp4", "output.mp4")
            .video_filter("scale=1080:1920")
            .output_args(["-c:v", "libx264", "-crf", "23"]);

        let args = cmd.build_args();
        assert_eq!(args[0], "-y");
        assert!(args.contains(&"-nostdin".to_string()));
        assert!(args.windows(2).any(|w| w == ["-v", "error"]));
        assert!(args.windows(2).any(|w| w == ["-progress", "pipe:2"]));
        assert!(args.windows(2).any(|w| w == ["-i", "input.mp4"]));
        assert!(args.windows(2).any(|w| w == ["-vf", "scale=1080:1920"]));
        assert_eq!(args.last().unwrap(), "output.mp4");

        let input_pos = args.iter().position(|a| a == "-i").unwrap();
        let vf_pos = args.iter().position(|a| a == "-vf").unwrap();
        assert!(input_pos < vf_pos);
    }

    #[test]
    fn test_no_overwrite_flag() {
        let args = FfmpegCommand::new("a.mp4", "b.mp4").no_overwrite().build_args();
        assert_eq!(args[0], "-n");
    }

    #[test]
    fn test_diagnostic_line_filter() {
        assert!(!is_diagnostic_line("out_time=00:00:01.000000"));
        assert!(!is_diagnostic_line("progress=continue"));
        assert!(!is_diagnostic_line("frame=30"));
        assert!(!is_diagnostic_line("   "));
        assert!(is_diagnostic_line("Error opening input file x.mp4."));
        assert!(is_diagnostic_line("[libx264 @ 0x55] width not divisible by 2 (1081x1920)"));
        assert!(!is_diagnostic_line("frame=  120 fps= 30 q=28.0 time=00:00:04.00"));
    }

    #[test]
    fn test_missing_binary() {
        let runner = FfmpegRunner::new().with_binary("definitely-not-a-real-ffmpeg-binary");
        assert!(matches!(runner.check(), Err(MediaError::FfmpegNotFound(_))));
    }
}
