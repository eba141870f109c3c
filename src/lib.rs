pub mod error;
pub mod file_ops;
pub mod hashers;
pub mod job;
pub mod models;
pub mod report;
pub mod utils;

pub use error::ChecksumError;
pub use file_ops::compute;
pub use job::{start_job, CancelToken, ChecksumJob, JobConfig, JobEvent, JobHandle, PassMode};
pub use models::{Algorithm, ChecksumResult, JobOutcome, JobState};
