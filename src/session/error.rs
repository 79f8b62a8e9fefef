use crate::protocol::ProtocolError;
use crate::session::types::{FailureKind, Stage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Connection closed by peer during {stage}")]
    ConnectionClosed { stage: Stage },

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Run deadline elapsed during {stage}")]
    DeadlineElapsed { stage: Stage },
}

impl SessionError {
    /// Classify an I/O error raised while the session was in `stage`.
    ///
    /// EOF and resets mean the peer went away; anything else stays an I/O error.
    pub fn from_io(err: std::io::Error, stage: Stage) -> Self {
        use std::io::ErrorKind;

        match err.kind() {
            ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe => SessionError::ConnectionClosed { stage },
            _ => SessionError::Io(err),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            SessionError::Connection(_) | SessionError::ConnectionClosed { .. } => {
                FailureKind::Connection
            }
            SessionError::Protocol(_) => FailureKind::Protocol,
            SessionError::Io(_) => FailureKind::Io,
            SessionError::DeadlineElapsed { .. } => FailureKind::Deadline,
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_eof_counts_as_dropped_connection() {
        let err = SessionError::from_io(Error::from(ErrorKind::UnexpectedEof), Stage::Game);
        assert!(matches!(
            err,
            SessionError::ConnectionClosed { stage: Stage::Game }
        ));
        assert_eq!(err.kind(), FailureKind::Connection);
    }

    #[test]
    fn test_other_io_errors_stay_io() {
        let err = SessionError::from_io(Error::from(ErrorKind::TimedOut), Stage::Login);
        assert_eq!(err.kind(), FailureKind::Io);
    }

    #[test]
    fn test_protocol_error_kind() {
        let err: SessionError = ProtocolError::PayloadTooLarge(1 << 30).into();
        assert_eq!(err.kind(), FailureKind::Protocol);
    }
}
