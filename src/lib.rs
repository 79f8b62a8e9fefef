//! Load generator for the Buckshot game server
//!
//! Opens thousands of concurrent TCP connections, drives each through a short
//! scripted exchange of length-prefixed frames, and reports how many sessions
//! stayed healthy for the whole run.

pub mod aggregator;
pub mod config;
pub mod coordinator;
pub mod metrics;
pub mod protocol;
pub mod scheduler;
pub mod session;
