//! HTTP request parsing and representation.

use std::collections::HashMap;
use std::str::FromStr;
use serde::de::DeserializeOwned;

use crate::parser::error::Error;
use crate::parser::method::Method;
use crate::parser::version::HttpVersion;

/// Represents an HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request target, including any query string
    pub path: String,
    /// The HTTP version
    pub version: HttpVersion,
    /// The HTTP headers
    pub headers: HashMap<String, String>,
    /// The request body
    pub body: Vec<u8>,
    /// Named path parameters captured by the router
    pub params: HashMap<String, String>,
}

impl HttpRequest {
    /// Create a new HTTP request with an empty body.
    ///
    /// Path parameters stay empty until the router fills them in.
    pub fn new(method: Method, path: String, version: HttpVersion, headers: HashMap<String, String>) -> Self {
        Self {
            method,
            path,
            version,
            headers,
            body: Vec::new(),
            params: HashMap::new(),
        }
    }

    /// The path without its query string, as used for routing.
    pub fn route_path(&self) -> &str {
        match self.path.split_once('?') {
            Some((path, _)) => path,
            None => &self.path,
        }
    }

    /// Get a header value. Header names are matched case-insensitively.
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers
            .iter()
            .find_map(|(k, v)| k.eq_ignore_ascii_case(name).then_some(v))
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.get_header(name).is_some()
    }

    /// The declared body length, if the request carries `Content-Length`.
    pub fn content_length(&self) -> Result<Option<usize>, Error> {
        self.get_header("Content-Length")
            .map(|value| {
                value
                    .parse::<usize>()
                    .map_err(|_| Error::InvalidContentLength(value.clone()))
            })
            .transpose()
    }

    /// Decode the request body as JSON.
    ///
    /// The `Content-Type` header is not consulted; any body that decodes into
    /// `T` is accepted.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Get a named path parameter captured by the router.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use microcrud_rs::{HttpRequest, HttpVersion, Method};
    ///
    /// let mut request = HttpRequest::new(Method::GET, "/users/7".to_string(), HttpVersion::Http11, HashMap::new());
    /// request.params.insert("id".to_string(), "7".to_string());
    /// assert_eq!(request.param("id"), Some("7"));
    /// assert_eq!(request.param("name"), None);
    /// ```
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Locate the end of the header section.
///
/// Returns the offset of the first body byte, i.e. just past the blank line
/// that terminates the headers. Bare `\n\n` is tolerated alongside `\r\n\r\n`.
pub fn find_header_end(input: &[u8]) -> Option<usize> {
    let crlf = input
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| pos + 4);
    let lf = input
        .windows(2)
        .position(|w| w == b"\n\n")
        .map(|pos| pos + 2);

    match (crlf, lf) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn parse_request_line(line: &str) -> Result<(Method, String, HttpVersion), Error> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(Error::MalformedRequestLine(line.to_string()));
    }

    let method = Method::from_str(parts[0])?;

    let path = parts[1];
    if !path.starts_with('/') {
        return Err(Error::InvalidPath(path.to_string()));
    }

    let version = HttpVersion::from_str(parts[2])?;

    Ok((method, path.to_string(), version))
}

/// Parse an HTTP request from a byte slice.
///
/// `input` must contain the whole header section and, if `Content-Length`
/// is present, at least that many body bytes. Bytes past the declared body
/// are ignored.
///
/// # Examples
///
/// ```
/// use microcrud_rs::{parse_request, Method};
///
/// let raw = b"POST /users HTTP/1.1\r\nHost: localhost\r\nContent-Length: 16\r\n\r\n{\"name\":\"Carol\"}";
/// let request = parse_request(raw).unwrap();
/// assert_eq!(request.method, Method::POST);
/// assert_eq!(request.body, br#"{"name":"Carol"}"#);
/// ```
pub fn parse_request(input: &[u8]) -> Result<HttpRequest, Error> {
    if input.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::EmptyRequest);
    }

    let header_end = find_header_end(input);
    let head_bytes = &input[..header_end.unwrap_or(input.len())];
    let head = match std::str::from_utf8(head_bytes) {
        Ok(head) => head,
        // The read stopped inside a multi-byte character.
        Err(e) if header_end.is_none() && e.error_len().is_none() => {
            return Err(Error::IncompleteHeaders);
        }
        Err(_) => return Err(Error::MalformedRequestLine("Invalid UTF-8".to_string())),
    };

    let mut lines = head.lines();
    let request_line = lines.next().ok_or(Error::EmptyRequest)?;

    // Reject a bad request line as soon as it is complete, even if the
    // rest of the headers have not arrived.
    let line_complete = header_end.is_some() || head.contains('\n');
    if !line_complete {
        return Err(Error::IncompleteHeaders);
    }
    let (method, path, version) = parse_request_line(request_line)?;

    let Some(body_start) = header_end else {
        return Err(Error::IncompleteHeaders);
    };

    let mut headers = HashMap::new();
    for line in lines {
        if line.is_empty() {
            break;
        }

        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| Error::InvalidHeaderFormat(line.to_string()))?;
        headers.insert(name.trim().to_string(), value.trim().to_string());
    }

    let mut request = HttpRequest::new(method, path, version, headers);

    if version.requires_host() && !request.has_header("Host") {
        return Err(Error::MissingHeader("Host".to_string()));
    }

    if let Some(expected) = request.content_length()? {
        let received = input.len() - body_start;
        if received < expected {
            return Err(Error::IncompleteBody { expected, received });
        }
        request.body = input[body_start..body_start + expected].to_vec();
    }

    Ok(request)
}
