//! Metrics and observability module
//!
//! Records session lifecycle and frame traffic through the `metrics` facade.
//! Nothing is exported unless the Prometheus exporter is started; without an
//! installed recorder every call is a no-op.
//!
//! Key metrics exposed:
//! - Sessions started, succeeded, failed (by failure kind)
//! - Sessions currently in flight
//! - Frames sent and received
//! - Session duration distribution

pub mod exporter;
pub mod recorder;

pub use exporter::{render_metrics, start_metrics_server, MetricsConfig, MetricsError};
pub use recorder::{init_metrics, record_batch_launched, record_run_complete};
