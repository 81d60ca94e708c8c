//! Synchronous runner for queued Xerox sends.

use std::sync::Arc;

use tracing::{debug, info, warn};

use etd_xerox::{
    DocumentPredicates, DocumentTransmitter, RecordStore, SendFilesRequest, XeroxDispatcher,
};

use super::store::{JobQueue, JobQueueError};
use super::types::{Job, JobId, SEND_FILES_KIND};

/// Claims queued send jobs and runs them through a dispatcher.
///
/// Each job runs once. A failed send is recorded on the job and left for
/// inspection.
pub struct SendJobRunner<S, P, T, Q> {
    dispatcher: Arc<XeroxDispatcher<S, P, T>>,
    queue: Q,
}

impl<S, P, T, Q> SendJobRunner<S, P, T, Q>
where
    S: RecordStore,
    P: DocumentPredicates,
    T: DocumentTransmitter,
    Q: JobQueue,
{
    pub fn new(dispatcher: Arc<XeroxDispatcher<S, P, T>>, queue: Q) -> Self {
        Self { dispatcher, queue }
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    /// Queue a send request.
    pub fn enqueue(&self, request: &SendFilesRequest) -> Result<JobId, JobQueueError> {
        let job = Job::send_files(request)?;
        let id = self.queue.enqueue(job)?;
        debug!(job_id = %id, routes = request.route_ids.len(), "queued xerox send");
        Ok(id)
    }

    /// Run the oldest pending job. Returns `None` when the queue is idle.
    ///
    /// Send failures end up on the job; only queue errors are returned.
    pub fn run_next(&self) -> Result<Option<JobId>, JobQueueError> {
        let Some(mut job) = self.queue.claim_next()? else {
            return Ok(None);
        };

        match self.execute(&job) {
            Ok(()) => {
                job.mark_completed();
                info!(
                    job_id = %job.id,
                    duration_ms = job.duration_ms().unwrap_or_default(),
                    "xerox send completed"
                );
            }
            Err(error) => {
                warn!(job_id = %job.id, kind = %job.kind, error = %error, "xerox send failed");
                job.mark_failed(error);
            }
        }

        self.queue.update(&job)?;
        Ok(Some(job.id))
    }

    /// Run jobs until the queue has no pending work.
    pub fn run_pending(&self) -> Result<Vec<JobId>, JobQueueError> {
        let mut ran = Vec::new();
        while let Some(id) = self.run_next()? {
            ran.push(id);
        }
        Ok(ran)
    }

    fn execute(&self, job: &Job) -> Result<(), String> {
        if job.kind != SEND_FILES_KIND {
            return Err(format!("no handler for job kind: {}", job.kind));
        }
        let request = job.send_request().map_err(|e| e.to_string())?;
        self.dispatcher
            .run_request(&request)
            .map_err(|e| e.to_string())
    }
}
