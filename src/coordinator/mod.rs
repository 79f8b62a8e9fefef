mod coordinator;
mod error;

pub use coordinator::StressCoordinator;
pub use error::{CoordinatorError, CoordinatorResult};
