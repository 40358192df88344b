//! Events delivered from the batch worker to its coordinator.
//!
//! The worker never touches coordinator state. Everything it has to say is
//! sent over a bounded channel and handled wherever the receiver lives.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::mpsc;

use reel_media::COMPLETE_PROGRESS;
use reel_models::{JobId, VideoJob};

/// Default capacity of the event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Aggregate outcome of one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Jobs picked up in this run
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Event emitted by the batch worker.
#[derive(Debug, Clone)]
pub enum QueueEvent {
    /// A job moved to `Processing`. `position` is 0-based within the run.
    JobStarted {
        job_id: JobId,
        position: usize,
        total: usize,
        source: PathBuf,
    },

    /// Encode progress in percent.
    Progress { job_id: JobId, percent: f64 },

    /// A job reached `Completed` or `Failed`.
    JobFinished { job: Box<VideoJob> },

    /// Every picked-up job has finished.
    BatchFinished { summary: BatchSummary },
}

/// Sending half used by the worker.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<QueueEvent>,
}

impl EventSender {
    pub fn new(tx: mpsc::Sender<QueueEvent>) -> Self {
        Self { tx }
    }

    /// Send a running progress update (non-blocking).
    ///
    /// Updates are dropped when the channel is full so the encoder's
    /// stderr reader never waits on the coordinator. Completion is not a
    /// running update: it only goes out through [`Self::completed`].
    pub fn progress(&self, job_id: &JobId, percent: f64) {
        if percent >= COMPLETE_PROGRESS {
            return;
        }
        let _ = self.tx.try_send(QueueEvent::Progress {
            job_id: job_id.clone(),
            percent,
        });
    }

    /// Send the single 100% update of a successful encode, waiting for
    /// room in the channel.
    pub async fn completed(&self, job_id: &JobId) {
        self.lifecycle(QueueEvent::Progress {
            job_id: job_id.clone(),
            percent: COMPLETE_PROGRESS,
        })
        .await;
    }

    /// Send a lifecycle event. A closed channel is ignored: the batch keeps
    /// running when nobody is listening.
    pub async fn lifecycle(&self, event: QueueEvent) {
        let _ = self.tx.send(event).await;
    }
}
