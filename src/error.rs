use thiserror::Error;

/// Result type for quality test operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for quality test operations
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Raw stat snapshot could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Transport/session error reported by the collaborator
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Event channel closed by the consumer
    #[error("Event channel closed")]
    ChannelClosed,

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
