//! Batch metrics.
//!
//! Recorded through the `metrics` facade; they are no-ops unless the host
//! binary installs a recorder.

use metrics::{counter, gauge, histogram};

use reel_models::FailureKind;

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_STARTED_TOTAL: &str = "reel_jobs_started_total";
    pub const JOBS_COMPLETED_TOTAL: &str = "reel_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "reel_jobs_failed_total";
    pub const JOBS_PENDING: &str = "reel_jobs_pending";
    pub const ENCODE_DURATION_SECONDS: &str = "reel_encode_duration_seconds";
}

pub fn record_job_started() {
    counter!(names::JOBS_STARTED_TOTAL).increment(1);
}

pub fn record_job_completed(duration_secs: f64) {
    counter!(names::JOBS_COMPLETED_TOTAL).increment(1);
    histogram!(names::ENCODE_DURATION_SECONDS).record(duration_secs);
}

pub fn record_job_failed(kind: FailureKind) {
    let labels = [("kind", kind.as_str().to_string())];
    counter!(names::JOBS_FAILED_TOTAL, &labels).increment(1);
}

pub fn set_pending_jobs(count: usize) {
    gauge!(names::JOBS_PENDING).set(count as f64);
}
