//! Infrastructure layer: record store, transmitters, background jobs, config.

pub mod config;
pub mod jobs;
pub mod record_store;
pub mod transmitter;

pub use config::{ConfigError, load_settings, load_settings_from};
pub use jobs::{
    InMemoryJobQueue, Job, JobId, JobQueue, JobQueueError, JobStats, JobStatus, SEND_FILES_KIND,
    SendJobRunner,
};
pub use record_store::InMemoryRecordStore;
pub use transmitter::{LoggingTransmitter, RecordingTransmitter, Transmission};
