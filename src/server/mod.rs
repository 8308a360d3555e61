//! HTTP server for microcrud-rs.
//!
//! Accepts connections on a Tokio listener, reads one request per
//! connection, dispatches it through the [`Router`] and writes the response
//! back before closing.

mod response;
mod config;
mod error;
mod router;
mod http_server;
mod tests;

// Re-export public items
pub use response::{HttpResponse, StatusCode};
pub use config::ServerConfig;
pub use error::Error;
pub use router::{HandlerFn, HandlerFuture, PathPattern, Route, Router};
pub use http_server::HttpServer;
