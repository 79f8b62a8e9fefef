//! Shared helpers for end-to-end harness tests

pub mod mock_server;

pub use mock_server::{Behaviour, MockServer};
