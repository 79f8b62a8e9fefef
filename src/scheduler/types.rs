use crate::scheduler::error::{SchedulerError, SchedulerResult};
use std::ops::Range;
use std::time::Duration;

/// How a run's sessions are released
#[derive(Debug, Clone)]
pub struct LaunchSettings {
    pub total: usize,
    pub batch_size: usize,
    pub batch_delay: Duration,
    /// Per-session lifetime, measured from the moment the session may connect
    pub duration: Duration,
    /// Upper bound on sessions holding a connection at once
    pub max_in_flight: Option<usize>,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            total: 2000,
            batch_size: 200,
            batch_delay: Duration::from_millis(100),
            duration: Duration::from_secs(5),
            max_in_flight: None,
        }
    }
}

/// Partition of `total` session indices into consecutive batches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchPlan {
    total: usize,
    batch_size: usize,
}

impl LaunchPlan {
    pub fn new(total: usize, batch_size: usize) -> SchedulerResult<Self> {
        if batch_size == 0 {
            return Err(SchedulerError::InvalidBatchSize);
        }
        Ok(Self { total, batch_size })
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn batch_count(&self) -> usize {
        self.total.div_ceil(self.batch_size)
    }

    /// Index ranges, one per batch; only the last may be short
    pub fn batches(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..self.total)
            .step_by(self.batch_size)
            .map(move |start| start..(start + self.batch_size).min(self.total))
    }
}
