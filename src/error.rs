//! Crate-wide error types

use crate::http::HttpError;
use crate::hub::StreamClosed;

/// Result alias using the crate error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for server and session operations
#[derive(Debug)]
pub enum Error {
    /// Underlying socket I/O failed (broken pipe, reset, timeout)
    Io(std::io::Error),
    /// Client sent a request we could not parse
    Http(HttpError),
    /// The frame source shut down while a session was streaming
    StreamClosed,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Http(e) => write!(f, "HTTP error: {}", e),
            Error::StreamClosed => write!(f, "Frame source closed"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Http(e) => Some(e),
            Error::StreamClosed => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<HttpError> for Error {
    fn from(e: HttpError) -> Self {
        Error::Http(e)
    }
}

impl From<StreamClosed> for Error {
    fn from(_: StreamClosed) -> Self {
        Error::StreamClosed
    }
}
