//! The `/users` resource.
//!
//! Handlers translate requests into [`UserStore`](crate::store::UserStore)
//! operations and wrap the outcome in an [`Envelope`].

mod envelope;
mod error;
mod handlers;

pub use envelope::{Envelope, Status};
pub use error::ApiError;
pub use handlers::{
    create_user, delete_user, get_user, hello, list_users, parse_id, register_routes,
    update_user, UserPayload, GREETING,
};
