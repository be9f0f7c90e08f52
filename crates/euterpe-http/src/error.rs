use thiserror::Error;

/// Errors produced while staging, dispatching or completing a request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    /// The target address could not be parsed as an absolute URL.
    #[error("invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },
    /// A staged header name is not a valid HTTP token.
    #[error("invalid header name {0:?}")]
    InvalidHeaderName(String),
    /// A staged header value (or content type) contains forbidden bytes.
    #[error("invalid value for header {0:?}")]
    InvalidHeaderValue(String),
    /// The session could not be created or cannot accept more work.
    #[error("http session unavailable: {0}")]
    SessionUnavailable(String),
    /// The request reached the session but no HTTP response came back.
    #[error("transport error: {0}")]
    Transport(String),
    /// Reading the response body failed part way.
    #[error("response body error: {0}")]
    Body(String),
    /// The caller's cancellation token fired.
    #[error("request cancelled")]
    Cancelled,
    /// A completion callback panicked; the payload message is kept.
    #[error("completion callback panicked: {0}")]
    CallbackPanicked(String),
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_body() || err.is_decode() {
            RequestError::Body(err.to_string())
        } else {
            RequestError::Transport(err.to_string())
        }
    }
}
