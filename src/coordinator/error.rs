use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("Config error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),

    #[error("Scheduler error: {0}")]
    SchedulerError(#[from] crate::scheduler::SchedulerError),
}

pub type CoordinatorResult<T> = Result<T, CoordinatorError>;
