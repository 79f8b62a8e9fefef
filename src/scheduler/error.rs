use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Batch size must be at least 1")]
    InvalidBatchSize,

    #[error("Failed to adjust resource limit: {0}")]
    ResourceLimit(String),

    #[error("Resource limits are not supported on this platform")]
    Unsupported,
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
