//! HTTP transport abstraction.
//!
//! The request client only needs "send this, give me status, content type and
//! body back". `ReqwestTransport` is the production implementation; tests plug
//! in scripted transports.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};

use crate::error::RequestError;

use super::types::{HttpRequest, HttpResponse, Method};

/// Performs a single HTTP exchange. Must not retry on its own.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Returns `Err` only when no response was received at all
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, RequestError>;
}

/// `reqwest`-backed transport
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Later entries replace earlier ones with the same name
fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, RequestError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| RequestError::Network(format!("invalid header name {:?}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| RequestError::Network(format!("invalid header value: {}", e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, RequestError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url)
            .headers(header_map(&request.headers)?);

        if let Some(ref body) = request.body {
            builder = builder.body(body.to_string());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RequestError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| RequestError::Network(e.to_string()))?;

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_map_keeps_one_value_per_name() {
        let map = header_map(&[
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Authorization".to_string(), "Bearer a".to_string()),
            ("content-type".to_string(), "text/plain".to_string()),
        ])
        .unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map.get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(map[CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn test_header_map_rejects_invalid_name() {
        let result = header_map(&[("bad header".to_string(), "x".to_string())]);
        assert!(matches!(result, Err(RequestError::Network(_))));
    }
}
