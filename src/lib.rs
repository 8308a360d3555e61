//! A minimal in-memory REST server for user records.
//!
//! The crate is split into four layers:
//!
//! - [`parser`]: HTTP/1.x request parsing from raw bytes
//! - [`store`]: the user record store and its id-assignment policy
//! - [`server`]: responses, routing with `{param}` segments, and the Tokio
//!   connection loop
//! - [`api`]: the `/users` CRUD handlers and their JSON envelope
//!
//! # Routes
//!
//! | Method   | Path          | Success                 | Failure            |
//! |----------|---------------|-------------------------|--------------------|
//! | `GET`    | `/`           | 200 greeting            |                    |
//! | `GET`    | `/users`      | 200 all users           |                    |
//! | `GET`    | `/users/{id}` | 200 user                | 404                |
//! | `POST`   | `/users`      | 201 created user        | 400 invalid JSON   |
//! | `PUT`    | `/users/{id}` | 200 updated user        | 400, 404           |
//! | `DELETE` | `/users/{id}` | 204 empty               | 404                |
//!
//! # Examples
//!
//! ```no_run
//! use microcrud_rs::{api, HttpServer, ServerConfig, UserStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = UserStore::seeded().into_shared();
//!     let server = HttpServer::new(ServerConfig::default());
//!     api::register_routes(&server, store).await;
//!     server.start().await?;
//!     Ok(())
//! }
//! ```
//!
//! Working with the store directly:
//!
//! ```
//! use microcrud_rs::{StoreError, UserStore};
//!
//! let mut store = UserStore::seeded();
//! let carol = store.create("Carol");
//! assert_eq!(carol.id, 3);
//! assert_eq!(store.update(2, "Bobby").unwrap().name, "Bobby");
//! assert_eq!(store.delete(999), Err(StoreError::NotFound(999)));
//! ```

pub mod parser;
pub mod store;
pub mod server;
pub mod api;

// Re-export commonly used items for convenience
pub use parser::{Error as ParserError, HttpRequest, HttpVersion, Method, parse_request};
pub use server::{Error as ServerError, HttpResponse, HttpServer, ServerConfig, StatusCode};
pub use store::{Error as StoreError, IdPolicy, SharedStore, User, UserStore};
