//! Error types for the HTTP server.

use thiserror::Error;

use crate::parser::Error as ParserError;

/// Errors that can occur while serving a connection.
#[derive(Debug, Error)]
pub enum Error {
    /// The request could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// No route matched the method and path.
    #[error("No route for {0}")]
    NotFound(String),

    /// The request grew past `ServerConfig::max_request_size`.
    #[error("Request exceeds {0} bytes")]
    RequestTooLarge(usize),

    /// A response body could not be serialized.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
