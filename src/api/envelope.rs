use serde::Serialize;

use crate::server::{Error, HttpResponse, StatusCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// The JSON wrapper around every `/users` response body.
///
/// ```json
/// {"status":"success","data":{"id":1,"name":"Alice"}}
/// {"status":"error","message":"User not found"}
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: Status::Success,
            data: Some(data),
            message: None,
        }
    }

    /// Serialize into a JSON response with the given status code.
    pub fn into_response(self, status: StatusCode) -> Result<HttpResponse, Error> {
        HttpResponse::new(status).with_json(&self)
    }
}

impl Envelope<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            data: None,
            message: Some(message.into()),
        }
    }
}
