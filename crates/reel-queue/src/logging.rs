//! Structured job logging utilities.

use tracing::{error, info, warn, Span};

use reel_models::VideoJob;

/// Job logger with the job ID and source file attached to every line.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    source: String,
}

impl JobLogger {
    pub fn new(job: &VideoJob) -> Self {
        Self {
            job_id: job.id.to_string(),
            source: job.file_name(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(job_id = %self.job_id, source = %self.source, "Job started: {}", message);
    }

    pub fn log_progress(&self, message: &str) {
        info!(job_id = %self.job_id, source = %self.source, "Job progress: {}", message);
    }

    pub fn log_warning(&self, message: &str) {
        warn!(job_id = %self.job_id, source = %self.source, "Job warning: {}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(job_id = %self.job_id, source = %self.source, "Job error: {}", message);
    }

    pub fn log_completion(&self, message: &str) {
        info!(job_id = %self.job_id, source = %self.source, "Job completed: {}", message);
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Span wrapping all work on this job.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("job", job_id = %self.job_id, source = %self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_logger_creation() {
        let job = VideoJob::new("/videos/clip.mp4");
        let logger = JobLogger::new(&job);
        assert_eq!(logger.job_id(), job.id.to_string());
        assert_eq!(logger.source, "clip.mp4");
    }
}
