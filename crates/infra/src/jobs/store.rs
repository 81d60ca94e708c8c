//! Job queue implementations.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;

use super::types::{Job, JobId, JobStatus};

/// Job queue abstraction.
pub trait JobQueue: Send + Sync {
    /// Enqueue a new job.
    fn enqueue(&self, job: Job) -> Result<JobId, JobQueueError>;

    /// Get a job by ID.
    fn get(&self, job_id: JobId) -> Result<Option<Job>, JobQueueError>;

    /// Update a job.
    fn update(&self, job: &Job) -> Result<(), JobQueueError>;

    /// Claim the oldest pending job and mark it running.
    /// Returns None if no jobs are available.
    fn claim_next(&self) -> Result<Option<Job>, JobQueueError>;

    /// List jobs by status, oldest first. `None` lists every job.
    fn list_by_status(
        &self,
        status: Option<&JobStatus>,
        limit: usize,
    ) -> Result<Vec<Job>, JobQueueError>;

    /// Get job statistics.
    fn stats(&self) -> Result<JobStats, JobQueueError>;
}

impl<Q> JobQueue for Arc<Q>
where
    Q: JobQueue + ?Sized,
{
    fn enqueue(&self, job: Job) -> Result<JobId, JobQueueError> {
        (**self).enqueue(job)
    }

    fn get(&self, job_id: JobId) -> Result<Option<Job>, JobQueueError> {
        (**self).get(job_id)
    }

    fn update(&self, job: &Job) -> Result<(), JobQueueError> {
        (**self).update(job)
    }

    fn claim_next(&self) -> Result<Option<Job>, JobQueueError> {
        (**self).claim_next()
    }

    fn list_by_status(
        &self,
        status: Option<&JobStatus>,
        limit: usize,
    ) -> Result<Vec<Job>, JobQueueError> {
        (**self).list_by_status(status, limit)
    }

    fn stats(&self) -> Result<JobStats, JobQueueError> {
        (**self).stats()
    }
}

/// Job queue error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobQueueError {
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("job already exists: {0}")]
    AlreadyExists(JobId),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("invalid job payload: {0}")]
    Payload(String),
}

impl From<serde_json::Error> for JobQueueError {
    fn from(err: serde_json::Error) -> Self {
        Self::Payload(err.to_string())
    }
}

/// Job statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct JobStats {
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
}

/// In-memory job queue for tests/dev.
///
/// Jobs keep their enqueue order, which is also the claim order.
#[derive(Debug, Default)]
pub struct InMemoryJobQueue {
    jobs: RwLock<IndexMap<JobId, Job>>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, IndexMap<JobId, Job>>, JobQueueError> {
        self.jobs
            .read()
            .map_err(|_| JobQueueError::Storage("job queue lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, IndexMap<JobId, Job>>, JobQueueError> {
        self.jobs
            .write()
            .map_err(|_| JobQueueError::Storage("job queue lock poisoned".to_string()))
    }
}

impl JobQueue for InMemoryJobQueue {
    fn enqueue(&self, job: Job) -> Result<JobId, JobQueueError> {
        let mut jobs = self.write()?;
        if jobs.contains_key(&job.id) {
            return Err(JobQueueError::AlreadyExists(job.id));
        }
        let id = job.id;
        jobs.insert(id, job);
        Ok(id)
    }

    fn get(&self, job_id: JobId) -> Result<Option<Job>, JobQueueError> {
        Ok(self.read()?.get(&job_id).cloned())
    }

    fn update(&self, job: &Job) -> Result<(), JobQueueError> {
        let mut jobs = self.write()?;
        match jobs.get_mut(&job.id) {
            Some(existing) => {
                *existing = job.clone();
                Ok(())
            }
            None => Err(JobQueueError::NotFound(job.id)),
        }
    }

    fn claim_next(&self) -> Result<Option<Job>, JobQueueError> {
        let mut jobs = self.write()?;
        let next = jobs
            .values_mut()
            .find(|job| matches!(job.status, JobStatus::Pending));
        Ok(next.map(|job| {
            job.mark_running();
            job.clone()
        }))
    }

    fn list_by_status(
        &self,
        status: Option<&JobStatus>,
        limit: usize,
    ) -> Result<Vec<Job>, JobQueueError> {
        Ok(self
            .read()?
            .values()
            .filter(|job| match status {
                Some(s) => std::mem::discriminant(&job.status) == std::mem::discriminant(s),
                None => true,
            })
            .take(limit)
            .cloned()
            .collect())
    }

    fn stats(&self) -> Result<JobStats, JobQueueError> {
        let mut stats = JobStats::default();
        for job in self.read()?.values() {
            match &job.status {
                JobStatus::Pending => stats.pending += 1,
                JobStatus::Running => stats.running += 1,
                JobStatus::Completed => stats.completed += 1,
                JobStatus::Failed { .. } => stats.failed += 1,
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::types::SEND_FILES_KIND;
    use proptest::prelude::*;

    fn job() -> Job {
        Job::new(SEND_FILES_KIND, serde_json::json!({ "route_ids": [] }))
    }

    #[test]
    fn enqueue_and_claim_in_fifo_order() {
        let queue = InMemoryJobQueue::new();
        let first = queue.enqueue(job()).unwrap();
        let second = queue.enqueue(job()).unwrap();

        let claimed = queue.claim_next().unwrap().unwrap();
        assert_eq!(claimed.id, first);
        assert!(matches!(claimed.status, JobStatus::Running));

        let claimed = queue.claim_next().unwrap().unwrap();
        assert_eq!(claimed.id, second);

        assert!(queue.claim_next().unwrap().is_none());
    }

    #[test]
    fn duplicate_enqueue_is_rejected() {
        let queue = InMemoryJobQueue::new();
        let j = job();
        queue.enqueue(j.clone()).unwrap();
        assert_eq!(
            queue.enqueue(j.clone()).unwrap_err(),
            JobQueueError::AlreadyExists(j.id)
        );
    }

    #[test]
    fn update_unknown_job_is_not_found() {
        let queue = InMemoryJobQueue::new();
        let j = job();
        assert_eq!(queue.update(&j).unwrap_err(), JobQueueError::NotFound(j.id));
    }

    #[test]
    fn list_and_stats_by_status() {
        let queue = InMemoryJobQueue::new();
        queue.enqueue(job()).unwrap();
        queue.enqueue(job()).unwrap();
        let mut failed = queue.claim_next().unwrap().unwrap();
        failed.mark_failed("boom");
        queue.update(&failed).unwrap();

        let any_failure = JobStatus::Failed {
            error: String::new(),
        };
        let listed = queue.list_by_status(Some(&any_failure), 10).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, failed.id);
        assert_eq!(queue.list_by_status(None, 1).unwrap().len(), 1);

        assert_eq!(
            queue.stats().unwrap(),
            JobStats {
                pending: 1,
                failed: 1,
                ..JobStats::default()
            }
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, ..ProptestConfig::default() })]

        #[test]
        fn claims_follow_enqueue_order(count in 0usize..20) {
            let queue = InMemoryJobQueue::new();
            let enqueued: Vec<JobId> = (0..count)
                .map(|_| queue.enqueue(job()).unwrap())
                .collect();

            let mut claimed = Vec::new();
            while let Some(job) = queue.claim_next().unwrap() {
                claimed.push(job.id);
            }

            prop_assert_eq!(claimed, enqueued);
            prop_assert_eq!(queue.stats().unwrap().running, count);
        }
    }
}
