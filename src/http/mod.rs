//! Minimal HTTP/1.1 support for the streaming server
//!
//! This module provides exactly what serving an MJPEG feed needs: request
//! parsing over an async reader, response writing helpers, and form decoding
//! for the login stub. It is not a general HTTP implementation.

pub mod form;
pub mod request;
pub mod response;

pub use request::{read_request, Method, Request};
pub use response::{Status, MULTIPART_BOUNDARY};

/// Error type for HTTP request parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// Request line was not `METHOD TARGET VERSION`
    MalformedRequestLine,
    /// A header line had no `:` separator
    MalformedHeader,
    /// Head (request line + headers) exceeded the configured cap
    RequestTooLarge,
    /// Connection closed before a complete request was read
    UnexpectedEof,
    /// `Content-Length` was present but not a number
    InvalidContentLength,
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::MalformedRequestLine => write!(f, "malformed request line"),
            HttpError::MalformedHeader => write!(f, "malformed header"),
            HttpError::RequestTooLarge => write!(f, "request too large"),
            HttpError::UnexpectedEof => write!(f, "connection closed mid-request"),
            HttpError::InvalidContentLength => write!(f, "invalid Content-Length"),
        }
    }
}

impl std::error::Error for HttpError {}
