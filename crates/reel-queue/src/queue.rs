//! Ordered job list and batch startup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use reel_media::{ensure_output_dir, Transcoder};
use reel_models::{FontChoice, JobId, JobStatus, OutputFormat, VideoJob, VideoMetadata};

use crate::error::{QueueError, QueueResult, StartError};
use crate::events::{BatchSummary, EventSender, QueueEvent, DEFAULT_EVENT_CAPACITY};
use crate::worker::BatchWorker;

/// Settings fixed for the duration of one run.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    /// Directory receiving `<stem>_out.<ext>` files
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub font: FontChoice,
    /// Capacity of the event channel
    pub event_capacity: usize,
}

impl BatchSettings {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            format: OutputFormat::vertical(),
            font: FontChoice::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    pub fn with_font(mut self, font: FontChoice) -> Self {
        self.font = font;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }
}

/// Ordered collection of conversion jobs.
///
/// The queue is the only owner of its jobs. While a batch runs it lives
/// inside the worker task; the coordinator sees read-only snapshots and is
/// handed the queue back when the run ends.
#[derive(Debug, Default)]
pub struct BatchQueue {
    jobs: Vec<VideoJob>,
}

impl BatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn jobs(&self) -> &[VideoJob] {
        &self.jobs
    }

    pub fn get(&self, id: &JobId) -> Option<&VideoJob> {
        self.jobs.iter().find(|job| &job.id == id)
    }

    pub(crate) fn jobs_mut(&mut self) -> &mut [VideoJob] {
        &mut self.jobs
    }

    fn get_mut(&mut self, id: &JobId) -> QueueResult<&mut VideoJob> {
        self.jobs
            .iter_mut()
            .find(|job| &job.id == id)
            .ok_or_else(|| QueueError::JobNotFound(id.clone()))
    }

    /// Append a job for `source`. The same source may be queued repeatedly;
    /// each job gets its own output name.
    pub fn enqueue(&mut self, source: impl Into<PathBuf>) -> JobId {
        self.enqueue_job(VideoJob::new(source))
    }

    /// Append a prepared job, resetting it to `Pending`.
    pub fn enqueue_job(&mut self, mut job: VideoJob) -> JobId {
        if job.status != JobStatus::Pending {
            job.status = JobStatus::Pending;
            job.error_message = None;
            job.failure_kind = None;
            job.output_path = None;
        }
        let id = job.id.clone();
        self.jobs.push(job);
        id
    }

    pub fn contains_source(&self, source: &Path) -> bool {
        self.jobs.iter().any(|job| job.source_path() == source)
    }

    /// Append sources that are not already queued. Returns the new IDs.
    pub fn add_videos<I, P>(&mut self, sources: I) -> Vec<JobId>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut added = Vec::new();
        for source in sources {
            let source = source.into();
            if self.contains_source(&source) {
                continue;
            }
            added.push(self.enqueue(source));
        }
        added
    }

    pub fn remove(&mut self, id: &JobId) -> QueueResult<VideoJob> {
        let pos = self
            .jobs
            .iter()
            .position(|job| &job.id == id)
            .ok_or_else(|| QueueError::JobNotFound(id.clone()))?;
        Ok(self.jobs.remove(pos))
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    pub fn set_caption(&mut self, id: &JobId, caption: &str) -> QueueResult<()> {
        self.get_mut(id)?.set_caption(caption);
        Ok(())
    }

    /// Give `caption` to every job that has none. Returns how many changed.
    pub fn apply_bulk_caption(&mut self, caption: &str) -> usize {
        let mut count = 0;
        for job in self.jobs.iter_mut().filter(|job| !job.has_caption()) {
            job.set_caption(caption);
            if job.has_caption() {
                count += 1;
            }
        }
        count
    }

    pub fn set_metadata(&mut self, id: &JobId, meta: VideoMetadata) -> QueueResult<()> {
        self.get_mut(id)?.set_metadata(meta);
        Ok(())
    }

    /// Probe every job whose dimensions are still unknown. Returns how many
    /// now have dimensions.
    pub async fn probe_unknown(&mut self, transcoder: &dyn Transcoder) -> usize {
        let mut known = 0;
        for job in self.jobs.iter_mut().filter(|job| !job.has_dimensions()) {
            job.set_metadata(transcoder.probe(job.source_path()).await);
            if job.has_dimensions() {
                known += 1;
            }
        }
        known
    }

    /// Put a finished job back to `Pending` so the next run picks it up.
    pub fn resubmit(&mut self, id: &JobId) -> QueueResult<()> {
        self.get_mut(id)?.transition(JobStatus::Pending)?;
        Ok(())
    }

    /// Resubmit every failed job. Returns how many were reset.
    pub fn resubmit_failed(&mut self) -> usize {
        let mut count = 0;
        for job in self.jobs.iter_mut().filter(|j| j.status == JobStatus::Failed) {
            if job.transition(JobStatus::Pending).is_ok() {
                count += 1;
            }
        }
        count
    }

    pub fn pending_count(&self) -> usize {
        self.count(JobStatus::Pending)
    }

    pub fn count(&self, status: JobStatus) -> usize {
        self.jobs.iter().filter(|job| job.status == status).count()
    }

    /// Start processing every `Pending` job on a background worker.
    ///
    /// The encoder and output directory are checked first; if either is
    /// unusable no job is touched and the queue is returned in the error.
    pub async fn start(
        self,
        transcoder: Arc<dyn Transcoder>,
        settings: BatchSettings,
    ) -> Result<BatchRun, StartError> {
        if let Err(error) = self.preflight(transcoder.as_ref(), &settings).await {
            return Err(StartError { queue: self, error });
        }

        let (event_tx, event_rx) = mpsc::channel(settings.event_capacity.max(1));
        let (snapshot_tx, snapshot_rx) = watch::channel(self.jobs.clone());

        info!(
            pending = self.pending_count(),
            output_dir = %settings.output_dir.display(),
            "Starting batch"
        );

        let worker = BatchWorker::new(
            transcoder,
            settings,
            EventSender::new(event_tx),
            snapshot_tx,
        );
        let handle = tokio::spawn(worker.run(self));

        Ok(BatchRun {
            events: event_rx,
            snapshots: snapshot_rx,
            handle,
        })
    }

    async fn preflight(
        &self,
        transcoder: &dyn Transcoder,
        settings: &BatchSettings,
    ) -> QueueResult<()> {
        if self.pending_count() == 0 {
            return Err(QueueError::NothingPending);
        }

        transcoder
            .check_available()
            .map_err(QueueError::EncoderUnavailable)?;

        ensure_output_dir(&settings.output_dir)
            .await
            .map_err(QueueError::OutputDir)?;

        Ok(())
    }
}

/// Handle on a running batch.
#[derive(Debug)]
pub struct BatchRun {
    events: mpsc::Receiver<QueueEvent>,
    snapshots: watch::Receiver<Vec<VideoJob>>,
    handle: JoinHandle<(BatchQueue, BatchSummary)>,
}

impl BatchRun {
    /// Next event; `None` once the worker has finished and the channel is
    /// drained.
    pub async fn next_event(&mut self) -> Option<QueueEvent> {
        self.events.recv().await
    }

    /// Next event if one is ready, without waiting.
    pub fn try_next_event(&mut self) -> Option<QueueEvent> {
        self.events.try_recv().ok()
    }

    /// Latest copy of the job list.
    pub fn snapshot(&self) -> Vec<VideoJob> {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified whenever a job changes status.
    pub fn subscribe(&self) -> watch::Receiver<Vec<VideoJob>> {
        self.snapshots.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Feed every event to `on_event`, then return the queue and summary.
    pub async fn drain<F>(mut self, mut on_event: F) -> QueueResult<(BatchQueue, BatchSummary)>
    where
        F: FnMut(QueueEvent),
    {
        while let Some(event) = self.events.recv().await {
            on_event(event);
        }
        self.wait().await
    }

    /// Wait for the worker, discarding any events not yet read.
    pub async fn wait(self) -> QueueResult<(BatchQueue, BatchSummary)> {
        // Closing the receiver keeps the worker from blocking on a full channel
        drop(self.events);
        self.handle.await.map_err(|e| {
            warn!("Batch worker did not finish: {}", e);
            QueueError::worker_failed(e.to_string())
        })
    }
}
