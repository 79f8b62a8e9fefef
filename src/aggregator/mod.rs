//! Reduces every session outcome of a run into one tally

pub mod collector;
pub mod types;

pub use collector::{collect, RunAggregator};
pub use types::RunResult;
