//! Background execution of Xerox sends.
//!
//! ## Design
//!
//! - One job is one unit of work: a serialized `SendFilesRequest`
//! - Jobs are claimed in FIFO order and run once; failures are recorded on the
//!   job, not retried
//! - Visibility into job status and failures through the queue
//!
//! ## Components
//!
//! - `Job`: job record with payload and metadata
//! - `JobQueue`: persistence for jobs (in-memory for tests/dev)
//! - `SendJobRunner`: claims jobs and runs them through the dispatcher

pub mod runner;
pub mod store;
pub mod types;

pub use runner::SendJobRunner;
pub use store::{InMemoryJobQueue, JobQueue, JobQueueError, JobStats};
pub use types::{Job, JobId, JobStatus, SEND_FILES_KIND};
