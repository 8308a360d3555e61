use thiserror::Error;

use crate::api::Envelope;
use crate::server::{Error, HttpResponse, StatusCode};
use crate::store;

/// Failures a `/users` handler reports to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("User not found")]
    NotFound(#[from] store::Error),

    #[error("Invalid JSON")]
    InvalidBody(#[from] crate::parser::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NotFound,
            ApiError::InvalidBody(_) => StatusCode::BadRequest,
        }
    }

    /// Render as an error envelope. The display text is the client-facing message.
    pub fn into_response(self) -> Result<HttpResponse, Error> {
        Envelope::error(self.to_string()).into_response(self.status_code())
    }
}
