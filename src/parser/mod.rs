//! HTTP/1.x request parsing.
//!
//! The parser works on a complete byte buffer. When the buffer holds the
//! header section but not yet the whole body announced by `Content-Length`,
//! [`parse_request`] reports [`Error::IncompleteBody`] so the caller can keep
//! reading from the socket.

mod request;
mod method;
mod version;
mod error;

pub use request::{HttpRequest, find_header_end, parse_request};
pub use method::Method;
pub use version::HttpVersion;
pub use error::Error;
