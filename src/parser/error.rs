//! Error types for the HTTP parser.

use thiserror::Error;

/// Errors that can occur while parsing an HTTP request.
#[derive(Debug, Error)]
pub enum Error {
    /// The request method is not one we understand.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// The request target does not start with `/`.
    #[error("Invalid HTTP path: {0}")]
    InvalidPath(String),

    /// The request line does not have exactly three parts.
    #[error("Malformed request line: {0}")]
    MalformedRequestLine(String),

    #[error("Invalid HTTP version: {0}")]
    InvalidVersion(String),

    /// A required header is missing from the request.
    #[error("Required header is missing: {0}")]
    MissingHeader(String),

    /// A header line without a `:` separator.
    #[error("Invalid header line: {0}")]
    InvalidHeaderFormat(String),

    #[error("Invalid Content-Length: {0}")]
    InvalidContentLength(String),

    /// The header terminator has not been seen yet.
    #[error("Incomplete request headers")]
    IncompleteHeaders,

    /// Fewer body bytes than `Content-Length` announced.
    #[error("Incomplete body: expected {expected} bytes, received {received}")]
    IncompleteBody { expected: usize, received: usize },

    #[error("Empty request")]
    EmptyRequest,

    /// The body could not be decoded as JSON.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// Whether more bytes from the peer could turn this into a valid request.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Error::IncompleteHeaders | Error::IncompleteBody { .. })
    }
}
