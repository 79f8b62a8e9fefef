//! Throttled session launch
//!
//! Sessions start in fixed-size batches separated by a short delay so that
//! thousands of connection attempts never hit the OS in one burst.

pub mod error;
pub mod launcher;
pub mod limits;
pub mod types;

pub use error::{SchedulerError, SchedulerResult};
pub use launcher::{launch, SessionHandle};
pub use limits::raise_fd_limit;
pub use types::{LaunchPlan, LaunchSettings};
