//! Metrics recorder for stress runs

use crate::session::SessionOutcome;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize metric descriptions (call once at startup)
pub fn init_metrics() {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        return; // Already initialized
    }

    describe_counter!(
        "stress_sessions_started_total",
        "Total number of sessions started"
    );
    describe_counter!(
        "stress_sessions_succeeded_total",
        "Sessions that completed their script or were healthy at the deadline"
    );
    describe_counter!(
        "stress_sessions_failed_total",
        "Sessions that failed, labelled by failure kind"
    );
    describe_counter!("stress_frames_sent_total", "Total frames written");
    describe_counter!("stress_frames_received_total", "Total frames read");
    describe_counter!("stress_batches_launched_total", "Launch batches started");

    describe_gauge!("stress_sessions_active", "Sessions currently in flight");
    describe_gauge!(
        "stress_run_success_ratio",
        "Success ratio of the most recent completed run"
    );

    describe_histogram!(
        "stress_session_duration_seconds",
        "Wall-clock lifetime of one session"
    );
}

// ============== Session Lifecycle ==============

/// Keeps a session counted in `stress_sessions_active` until dropped, so a
/// session that unwinds still leaves the gauge
#[must_use = "the session stops counting as active when this is dropped"]
#[derive(Debug)]
pub struct ActiveSession {
    _private: (),
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        gauge!("stress_sessions_active").decrement(1.0);
    }
}

pub fn record_session_started() -> ActiveSession {
    counter!("stress_sessions_started_total").increment(1);
    gauge!("stress_sessions_active").increment(1.0);
    ActiveSession { _private: () }
}

pub fn record_session_finished(outcome: &SessionOutcome, duration: Duration) {
    histogram!("stress_session_duration_seconds").record(duration.as_secs_f64());

    match outcome {
        SessionOutcome::Success => counter!("stress_sessions_succeeded_total").increment(1),
        SessionOutcome::Failure(failure) => {
            counter!("stress_sessions_failed_total", "kind" => failure.kind.as_str()).increment(1)
        }
    }
}

// ============== Frame Traffic ==============

pub fn record_frame_sent() {
    counter!("stress_frames_sent_total").increment(1);
}

pub fn record_frame_received() {
    counter!("stress_frames_received_total").increment(1);
}

// ============== Run ==============

pub fn record_batch_launched(size: usize) {
    counter!("stress_batches_launched_total").increment(1);
    tracing::trace!(size, "batch recorded");
}

pub fn record_run_complete(succeeded: usize, total: usize) {
    let ratio = if total > 0 {
        succeeded as f64 / total as f64
    } else {
        0.0
    };
    gauge!("stress_run_success_ratio").set(ratio);
}
