use crate::aggregator::types::RunResult;
use crate::metrics::recorder::record_run_complete;
use crate::scheduler::SessionHandle;
use crate::session::{FailureKind, SessionOutcome};
use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{info, warn};

/// Incremental tally; each outcome must be recorded exactly once
#[derive(Debug)]
pub struct RunAggregator {
    succeeded: usize,
    failed: usize,
    failures_by_kind: BTreeMap<FailureKind, usize>,
    started_at: DateTime<Utc>,
    started: Instant,
}

impl RunAggregator {
    pub fn new() -> Self {
        Self {
            succeeded: 0,
            failed: 0,
            failures_by_kind: BTreeMap::new(),
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn record(&mut self, outcome: &SessionOutcome) {
        match outcome {
            SessionOutcome::Success => self.succeeded += 1,
            SessionOutcome::Failure(failure) => {
                self.failed += 1;
                *self.failures_by_kind.entry(failure.kind).or_insert(0) += 1;
            }
        }
    }

    pub fn recorded(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn finish(self) -> RunResult {
        let result = RunResult {
            total: self.recorded(),
            succeeded: self.succeeded,
            failed: self.failed,
            failures_by_kind: self.failures_by_kind,
            started_at: self.started_at,
            elapsed: self.started.elapsed(),
        };
        record_run_complete(result.succeeded, result.total);
        result
    }
}

impl Default for RunAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for every handle, in completion order, and tally the outcomes.
///
/// One session failing, or even panicking, never stops collection of the
/// rest: a join error is counted as a failure of that session.
pub async fn collect(handles: Vec<SessionHandle>) -> RunResult {
    let mut aggregator = RunAggregator::new();

    let mut pending: FuturesUnordered<_> = handles
        .into_iter()
        .map(|SessionHandle { index, handle }| async move { (index, handle.await) })
        .collect();

    while let Some((index, joined)) = pending.next().await {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Session {} did not complete: {}", index, e);
                SessionOutcome::failure(FailureKind::Panicked, e.to_string())
            }
        };
        aggregator.record(&outcome);
    }

    let result = aggregator.finish();
    info!(
        total = result.total,
        succeeded = result.succeeded,
        failed = result.failed,
        "run collected"
    );
    result
}
