//! FFmpeg progress parsing.
//!
//! FFmpeg reports elapsed output time on its diagnostic stream, either as
//! `time=HH:MM:SS.ff` in stats lines or `out_time=HH:MM:SS.ffffff` with
//! `-progress`. The percentage derived from it is an approximation: it is
//! capped below 100 while the process runs, and 100 is only reported once
//! the process has exited successfully.

use std::sync::OnceLock;

use regex::Regex;

/// Highest percentage reported while the encoder is still running.
pub const RUNNING_PROGRESS_CAP: f64 = 95.0;
/// Percentage reported after a successful exit.
pub const COMPLETE_PROGRESS: f64 = 100.0;

/// Callback type for progress updates (percentage in `0.0..=100.0`).
pub type ProgressCallback = Box<dyn Fn(f64) + Send + 'static>;

fn timestamp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"time=(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").expect("timestamp regex is valid")
    })
}

/// Elapsed seconds from the first `time=`/`out_time=` field in a line.
pub fn parse_timestamp_seconds(line: &str) -> Option<f64> {
    let caps = timestamp_regex().captures(line)?;
    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Turns diagnostic lines into a bounded, strictly increasing percentage.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total_secs: f64,
    last_emitted: f64,
    completed: bool,
}

impl ProgressTracker {
    /// Track progress against a total duration in seconds. With an unknown
    /// (zero) duration only the final completion is reported.
    pub fn new(total_secs: f64) -> Self {
        Self {
            total_secs,
            last_emitted: 0.0,
            completed: false,
        }
    }

    /// Last percentage handed out.
    pub fn last(&self) -> f64 {
        self.last_emitted
    }

    /// Feed one diagnostic line. Returns a percentage only when it strictly
    /// exceeds the previous one.
    pub fn observe(&mut self, line: &str) -> Option<f64> {
        if self.completed || self.total_secs <= 0.0 {
            return None;
        }

        let elapsed = parse_timestamp_seconds(line)?;
        let pct = (elapsed / self.total_secs * 100.0).min(RUNNING_PROGRESS_CAP);

        if pct > self.last_emitted {
            self.last_emitted = pct;
            Some(pct)
        } else {
            None
        }
    }

    /// Report completion after a successful exit. Yields 100 once.
    pub fn complete(&mut self) -> Option<f64> {
        if self.completed {
            return None;
        }
        self.completed = true;
        self.last_emitted = COMPLETE_PROGRESS;
        Some(COMPLETE_PROGRESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stats_line() {
        let line = "frame=  120 fps= 30 q=28.0 size=512kB time=00:00:04.00 bitrate=1048.6kbits/s speed=1.2x";
        assert_eq!(parse_timestamp_seconds(line), Some(4.0));
    }

    #[test]
    fn test_parse_progress_line() {
        assert_eq!(parse_timestamp_seconds("out_time=01:02:03.500000"), Some(3723.5));
        assert_eq!(parse_timestamp_seconds("out_time=N/A"), None);
        assert_eq!(parse_timestamp_seconds("out_time_ms=5000000"), None);
        assert_eq!(parse_timestamp_seconds("Press [q] to stop"), None);
    }

    #[test]
    fn test_percentage_is_capped() {
        let mut tracker = ProgressTracker::new(10.0);
        assert_eq!(tracker.observe("time=00:00:05.00"), Some(50.0));
        assert_eq!(tracker.observe("time=00:00:09.90"), Some(95.0));
        assert_eq!(tracker.observe("time=00:00:10.00"), None);
        assert_eq!(tracker.last(), 95.0);
    }

    #[test]
    fn test_monotonic_no_duplicates() {
        let mut tracker = ProgressTracker::new(100.0);
        let lines = [
            "time=00:00:10.00",
            "time=00:00:10.00",
            "time=00:00:05.00",
            "time=00:00:20.00",
            "noise",
            "time=00:00:30.00",
        ];
        let emitted: Vec<f64> = lines.iter().filter_map(|l| tracker.observe(l)).collect();
        assert_eq!(emitted, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_strictly_increasing_sequence() {
        let mut tracker = ProgressTracker::new(60.0);
        let emitted: Vec<f64> = (0..=120)
            .map(|s| format!("out_time=00:{:02}:{:02}.000000", s / 60, s % 60))
            .filter_map(|l| tracker.observe(&l))
            .collect();

        assert!(!emitted.is_empty());
        assert!(emitted.windows(2).all(|w| w[1] > w[0]));
        assert!(emitted.iter().all(|p| *p <= RUNNING_PROGRESS_CAP));
    }

    #[test]
    fn test_completion_reported_once() {
        let mut tracker = ProgressTracker::new(10.0);
        tracker.observe("time=00:00:05.00");
        assert_eq!(tracker.complete(), Some(100.0));
        assert_eq!(tracker.complete(), None);
        assert_eq!(tracker.observe("time=00:00:09.00"), None);
    }

    #[test]
    fn test_unknown_duration_only_completes() {
        let mut tracker = ProgressTracker::new(0.0);
        assert_eq!(tracker.observe("time=00:00:05.00"), None);
        assert_eq!(tracker.complete(), Some(100.0));
    }
}
