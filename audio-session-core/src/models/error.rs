use thiserror::Error;

/// Errors that can occur while opening, driving, or tearing down a session.
///
/// Every controller operation returns these as a typed result and also logs
/// them, so hosts that only watch diagnostics still see the failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no default input device")]
    NoInputDevice,

    #[error("no default output device")]
    NoOutputDevice,

    #[error("failed to open stream: {0}")]
    StreamOpen(String),

    #[error("failed to start stream: {0}")]
    StreamStart(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Raised inside the real-time path when the session or driver buffer is missing.
    #[error("null buffer in stream callback")]
    NullBuffer,

    #[error("capture stream is not open")]
    NotOpen,

    #[error("driver error: {0}")]
    Driver(String),
}
