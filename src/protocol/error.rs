use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Short frame header: expected {expected} bytes, got {actual}")]
    ShortHeader { expected: usize, actual: usize },

    #[error("Payload of {0} bytes exceeds frame limit")]
    PayloadTooLarge(usize),

    #[error("Declared payload length {declared} does not match {actual} bytes")]
    PayloadMismatch { declared: u32, actual: usize },
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
