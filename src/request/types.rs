//! Request and response shapes shared by the client and its transports

use std::fmt;

use serde_json::Value;

/// HTTP verbs used against the resource API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Whether repeating the call is free of extra side effects when the
    /// server is idempotent-by-id. Creates are not.
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, Method::Post)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied options for one request
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    /// Extra headers; these override the defaults with the same name
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::new(Method::Get, None)
    }

    pub fn post(body: Value) -> Self {
        Self::new(Method::Post, Some(body))
    }

    pub fn put(body: Value) -> Self {
        Self::new(Method::Put, Some(body))
    }

    pub fn delete() -> Self {
        Self::new(Method::Delete, None)
    }

    pub fn new(method: Method, body: Option<Value>) -> Self {
        Self {
            method,
            body,
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

/// Ephemeral record of one outbound call
#[derive(Debug, Clone)]
pub struct RequestAttempt {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub attempts_remaining: u32,
}

impl RequestAttempt {
    pub fn new(method: Method, path: impl Into<String>, body: Option<Value>, max_attempts: u32) -> Self {
        Self {
            method,
            path: path.into(),
            body,
            attempts_remaining: max_attempts.max(1),
        }
    }
}

/// Wire-level request handed to a transport
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Set `name`, replacing any existing header of that name (ASCII
    /// case-insensitive)
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Wire-level response returned by a transport
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            content_type: Some("application/json; charset=utf-8".to_string()),
            body: body.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
    }
}
