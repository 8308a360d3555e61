//! HTTP response types and utilities.

use std::collections::HashMap;
use serde::Serialize;

use crate::server::error::Error;

/// Status codes the server emits, with their standard reason phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok = 200,
    Created = 201,
    NoContent = 204,
    BadRequest = 400,
    NotFound = 404,
    PayloadTooLarge = 413,
    InternalServerError = 500,
    ServiceUnavailable = 503,
}

impl StatusCode {
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Get the reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::NoContent => "No Content",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// 204 responses must not carry a body or a `Content-Length`.
    pub fn allows_body(&self) -> bool {
        !matches!(self, StatusCode::NoContent)
    }
}

/// Represents an HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// The HTTP status code
    pub status: StatusCode,
    /// The HTTP headers
    pub headers: HashMap<String, String>,
    /// The response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a new HTTP response with the given status code.
    ///
    /// Every response closes the connection; the server handles a single
    /// request per connection.
    pub fn new(status: StatusCode) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Server".to_string(), "microcrud-rs".to_string());
        headers.insert("Connection".to_string(), "close".to_string());

        Self {
            status,
            headers,
            body: Vec::new(),
        }
    }

    /// Shorthand for a `text/plain` response.
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status)
            .with_content_type("text/plain; charset=utf-8")
            .with_body_string(body)
    }

    /// Set the response body with a string.
    pub fn with_body_string(self, body: impl Into<String>) -> Self {
        self.with_body_bytes(body.into().into_bytes())
    }

    /// Set the response body with bytes.
    pub fn with_body_bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        let content_length = self.body.len().to_string();
        self.with_header("Content-Length", content_length)
    }

    /// Add or replace a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the content type.
    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_header("Content-Type", content_type)
    }

    /// Serialize `value` as the JSON body.
    pub fn with_json<T: Serialize>(self, value: &T) -> Result<Self, Error> {
        let json = serde_json::to_vec(value)?;
        Ok(self
            .with_content_type("application/json")
            .with_body_bytes(json))
    }

    /// Convert the response to bytes.
    ///
    /// A `Content-Length` of zero is filled in for empty bodies, except on
    /// statuses that forbid a body, where both are dropped.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(128 + self.body.len());

        let status_line = format!("HTTP/1.1 {} {}\r\n", self.status.as_u16(), self.status.reason_phrase());
        bytes.extend_from_slice(status_line.as_bytes());

        let allows_body = self.status.allows_body();
        for (name, value) in &self.headers {
            if !allows_body && name.eq_ignore_ascii_case("Content-Length") {
                continue;
            }
            bytes.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
        }
        if allows_body && !self.headers.contains_key("Content-Length") {
            bytes.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        }

        bytes.extend_from_slice(b"\r\n");

        if allows_body {
            bytes.extend_from_slice(&self.body);
        }

        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_reason_phrase() {
        assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
        assert_eq!(StatusCode::NoContent.reason_phrase(), "No Content");
        assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
        assert_eq!(StatusCode::Created.as_u16(), 201);
    }

    #[test]
    fn test_http_response_creation() {
        let response = HttpResponse::new(StatusCode::Ok);
        assert_eq!(response.status, StatusCode::Ok);
        assert_eq!(response.headers.get("Server"), Some(&"microcrud-rs".to_string()));
        assert_eq!(response.headers.get("Connection"), Some(&"close".to_string()));
        assert!(response.body.is_empty());
    }

    #[test]
    fn test_http_response_with_body_string() {
        let body = "Hello, world!";
        let response = HttpResponse::new(StatusCode::Ok).with_body_string(body);

        assert_eq!(response.body, body.as_bytes());
        assert_eq!(response.headers.get("Content-Length"), Some(&"13".to_string()));
    }

    #[test]
    fn test_http_response_with_json() {
        #[derive(Serialize)]
        struct Payload {
            id: u64,
        }

        let response = HttpResponse::new(StatusCode::Created)
            .with_json(&Payload { id: 3 })
            .unwrap();

        assert_eq!(response.body, br#"{"id":3}"#);
        assert_eq!(response.headers.get("Content-Type"), Some(&"application/json".to_string()));
        assert_eq!(response.headers.get("Content-Length"), Some(&"8".to_string()));
    }

    #[test]
    fn test_http_response_to_bytes() {
        let response = HttpResponse::text(StatusCode::Ok, "Hello, world!");

        let bytes = response.to_bytes();
        let response_str = String::from_utf8_lossy(&bytes);

        assert!(response_str.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response_str.contains("Content-Type: text/plain; charset=utf-8\r\n"));
        assert!(response_str.contains("Content-Length: 13\r\n"));
        assert!(response_str.contains("Server: microcrud-rs\r\n"));
        assert!(response_str.ends_with("\r\n\r\nHello, world!"));
    }

    #[test]
    fn test_empty_body_gets_zero_content_length() {
        let bytes = HttpResponse::new(StatusCode::Ok).to_bytes();
        let response_str = String::from_utf8_lossy(&bytes);
        assert!(response_str.contains("Content-Length: 0\r\n"));
    }

    #[test]
    fn test_no_content_has_no_body_or_length() {
        let response = HttpResponse::new(StatusCode::NoContent).with_body_string("ignored");

        let bytes = response.to_bytes();
        let response_str = String::from_utf8_lossy(&bytes);

        assert!(response_str.starts_with("HTTP/1.1 204 No Content\r\n"));
        assert!(!response_str.contains("Content-Length"));
        assert!(response_str.ends_with("\r\n\r\n"));
    }
}
