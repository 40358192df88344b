//! Queue error types.

use thiserror::Error;

use reel_media::MediaError;
use reel_models::{InvalidTransition, JobId};

use crate::queue::BatchQueue;

pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Job not found: {0}")]
    JobNotFound(JobId),

    #[error("No pending jobs to process")]
    NothingPending,

    #[error("Encoder unavailable: {0}")]
    EncoderUnavailable(#[source] MediaError),

    #[error("Output directory unusable: {0}")]
    OutputDir(#[source] MediaError),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error("Worker failed: {0}")]
    WorkerFailed(String),
}

impl QueueError {
    pub fn worker_failed(msg: impl Into<String>) -> Self {
        Self::WorkerFailed(msg.into())
    }
}

/// A batch that could not start. The untouched queue is handed back.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct StartError {
    pub queue: BatchQueue,
    #[source]
    pub error: QueueError,
}

impl StartError {
    pub fn into_parts(self) -> (BatchQueue, QueueError) {
        (self.queue, self.error)
    }
}
