//! Sequential batch worker.
//!
//! Jobs run one at a time in queue order. A failing job is recorded and the
//! worker moves on; nothing a single job does can stop the batch.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;
use tracing::{info, Instrument};

use reel_media::{
    build_filter_spec, resolve_output_path, EncodeRequest, MediaResult, ProgressCallback,
    Transcoder,
};
use reel_models::{JobStatus, VideoJob};

use crate::events::{BatchSummary, EventSender, QueueEvent};
use crate::logging::JobLogger;
use crate::metrics;
use crate::queue::{BatchQueue, BatchSettings};

pub(crate) struct BatchWorker {
    transcoder: Arc<dyn Transcoder>,
    settings: BatchSettings,
    events: EventSender,
    snapshots: watch::Sender<Vec<VideoJob>>,
    /// Output paths handed out during this run
    reserved: HashSet<PathBuf>,
}

impl BatchWorker {
    pub(crate) fn new(
        transcoder: Arc<dyn Transcoder>,
        settings: BatchSettings,
        events: EventSender,
        snapshots: watch::Sender<Vec<VideoJob>>,
    ) -> Self {
        Self {
            transcoder,
            settings,
            events,
            snapshots,
            reserved: HashSet::new(),
        }
    }

    /// Process every job that was `Pending` when the run began.
    pub(crate) async fn run(mut self, mut queue: BatchQueue) -> (BatchQueue, BatchSummary) {
        let picked: Vec<usize> = queue
            .jobs()
            .iter()
            .enumerate()
            .filter(|(_, job)| job.status == JobStatus::Pending)
            .map(|(index, _)| index)
            .collect();

        let mut summary = BatchSummary {
            total: picked.len(),
            ..Default::default()
        };
        metrics::set_pending_jobs(summary.total);

        for (position, index) in picked.into_iter().enumerate() {
            match self.process_job(&mut queue, index, position, summary.total).await {
                JobStatus::Completed => summary.completed += 1,
                _ => summary.failed += 1,
            }
            metrics::set_pending_jobs(queue.pending_count());
        }

        info!(
            total = summary.total,
            completed = summary.completed,
            failed = summary.failed,
            "Batch finished"
        );
        self.events
            .lifecycle(QueueEvent::BatchFinished { summary })
            .await;

        (queue, summary)
    }

    async fn process_job(
        &mut self,
        queue: &mut BatchQueue,
        index: usize,
        position: usize,
        total: usize,
    ) -> JobStatus {
        let job = &mut queue.jobs_mut()[index];
        let logger = JobLogger::new(job);
        if let Err(e) = job.transition(JobStatus::Processing) {
            logger.log_warning(&e.to_string());
            return job.status;
        }
        let job_id = job.id.clone();
        let source = job.source_path().to_path_buf();

        metrics::record_job_started();
        logger.log_start(&format!("{} of {}", position + 1, total));
        self.publish(queue);
        self.events
            .lifecycle(QueueEvent::JobStarted {
                job_id: job_id.clone(),
                position,
                total,
                source,
            })
            .await;

        let clock = Instant::now();
        let job = &mut queue.jobs_mut()[index];
        let result = self
            .convert(job, &logger)
            .instrument(logger.create_span())
            .await;

        let outcome = match result {
            Ok(()) => job.transition(JobStatus::Completed).map(|_| {
                let elapsed = clock.elapsed().as_secs_f64();
                metrics::record_job_completed(elapsed);
                logger.log_completion(&format!("{:.1}s", elapsed));
            }),
            Err(e) => {
                let kind = e.failure_kind();
                logger.log_error(&e.to_string());
                job.fail(kind, e.job_message()).map(|_| metrics::record_job_failed(kind))
            }
        };
        match outcome {
            Ok(()) if job.status == JobStatus::Completed => {
                self.events.completed(&job_id).await;
            }
            Ok(()) => {}
            Err(e) => logger.log_warning(&e.to_string()),
        }

        let finished = job.clone();
        let status = finished.status;
        self.publish(queue);
        self.events
            .lifecycle(QueueEvent::JobFinished {
                job: Box::new(finished),
            })
            .await;

        status
    }

    /// Probe if needed, build the filter chain, pick an output name and
    /// encode.
    async fn convert(&mut self, job: &mut VideoJob, logger: &JobLogger) -> MediaResult<()> {
        if !job.has_dimensions() {
            let meta = self.transcoder.probe(job.source_path()).await;
            if !meta.is_known() {
                logger.log_warning("probe returned no dimensions");
            }
            job.set_metadata(meta);
        }

        let filter = build_filter_spec(
            job.width,
            job.height,
            job.caption(),
            &self.settings.font,
            &self.settings.format,
        )?;

        let output = resolve_output_path(
            &self.settings.output_dir,
            job.source_path(),
            &self.settings.format.extension,
            &self.reserved,
        );
        self.reserved.insert(output.clone());
        job.output_path = Some(output.clone());
        logger.log_progress(&format!("encoding to {}", output.display()));

        let request = EncodeRequest::new(job.source_path(), &output, filter, job.duration_secs);
        let events = self.events.clone();
        let job_id = job.id.clone();
        let progress: ProgressCallback = Box::new(move |percent| events.progress(&job_id, percent));

        self.transcoder.encode(&request, progress).await
    }

    /// Replace the snapshot even when no receiver is left.
    fn publish(&self, queue: &BatchQueue) {
        self.snapshots.send_replace(queue.jobs().to_vec());
    }
}
