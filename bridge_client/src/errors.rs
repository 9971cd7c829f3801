use thiserror::Error;

use crate::utils::describe_error;

/// Everything that can go wrong while turning a message into a bridge call.
///
/// The `Display` output is exactly what the extension sees in `error`.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The message carried no usable `url`.
    #[error("url is required")]
    MissingUrl,

    /// No token configured, nothing is sent without one.
    #[error("bridge token missing in native-host config")]
    MissingToken,

    /// The bridge answered with an HTTP error status.
    #[error("bridge request failed: {status}")]
    HttpStatus { status: u16, detail: String },

    /// Connection refused, timeout, DNS and the like.
    #[error("bridge request failed: {}", describe_error(.0))]
    HttpRequestError(#[from] reqwest::Error),

    /// The configured endpoint is not a URL.
    #[error("bridge request failed: invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

impl BridgeError {
    /// Diagnostic text that goes alongside the error, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            BridgeError::HttpStatus { detail, .. } => Some(detail),
            _ => None,
        }
    }

    /// True when the error was raised before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(self, BridgeError::MissingUrl | BridgeError::MissingToken)
    }
}
