pub mod connector;
pub mod error;
pub mod runner;
pub mod types;
pub mod wire;

pub use connector::{Connector, TcpConnector};
pub use error::{SessionError, SessionResult};
pub use runner::{run, run_session, SessionParams};
pub use types::{
    FailureKind, FollowUp, Script, ScriptKind, SessionFailure, SessionOutcome, Stage, SteadyState,
};
