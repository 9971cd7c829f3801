use std::io;
use thiserror::Error;

/// Failures while reading or writing a native messaging frame.
///
/// Only [`FrameError::Io`] and [`FrameError::Encode`] mean the channel itself
/// is unusable; the rest are answered and the loop carries on.
#[derive(Error, Debug)]
pub enum FrameError {
    /// The stream ended inside the 4-byte length prefix.
    #[error("invalid message length")]
    InvalidLength,

    #[error("native message length must be positive")]
    EmptyMessage,

    #[error("native message too large")]
    TooLarge(usize),

    #[error("message body truncated")]
    Truncated { expected: usize, received: usize },

    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("message payload must be object")]
    NotAnObject,

    #[error("failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("native messaging stream failed: {0}")]
    Io(#[from] io::Error),
}

impl FrameError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, FrameError::Io(_) | FrameError::Encode(_))
    }
}
