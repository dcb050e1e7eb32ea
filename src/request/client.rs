use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::CredentialProvider;
use crate::config::ApiConfig;
use crate::error::RequestError;
use crate::metrics::RequestMetrics;

use super::transport::HttpTransport;
use super::types::{HttpRequest, HttpResponse, RequestAttempt, RequestOptions};

/// Issues resource API calls with uniform error normalization and bounded retry.
///
/// Every failure is retried (network error, non-2xx, non-JSON) up to the
/// attempt limit with a fixed delay in between. That includes `POST`, which the
/// server does not guarantee to be idempotent; such retries are logged at
/// `warn` so duplicate creates can be traced.
pub struct RequestClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<dyn CredentialProvider>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl RequestClient {
    pub fn new(
        config: &ApiConfig,
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            transport,
            credentials,
            max_attempts: config.max_attempts.max(1),
            retry_delay: config.retry_delay(),
        }
    }

    /// Default attempt limit used by `fetch` and the typed helpers
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// GET with the default attempt limit
    pub async fn fetch(&self, path: &str) -> Result<Value, RequestError> {
        self.request(path, RequestOptions::get(), self.max_attempts)
            .await
    }

    /// GET and decode into `T`
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
        let value = self.fetch(path).await?;
        decode(value)
    }

    /// Issue `options` with the default attempt limit and decode into `T`
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, RequestError> {
        let value = self.request(path, options, self.max_attempts).await?;
        decode(value)
    }

    /// Perform a call, retrying any failure until `max_attempts` total
    /// attempts have been made. The last error is returned on exhaustion.
    #[tracing::instrument(
        name = "request",
        skip(self, options),
        fields(method = %options.method, path = %path)
    )]
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
        max_attempts: u32,
    ) -> Result<Value, RequestError> {
        let token = self
            .credentials
            .bearer_token()
            .ok_or(RequestError::Unauthorized)?;

        let RequestOptions {
            method,
            body,
            headers: extra_headers,
        } = options;
        let mut attempt = RequestAttempt::new(method, path, body, max_attempts);
        let total = attempt.attempts_remaining;

        loop {
            let number = total - attempt.attempts_remaining + 1;
            let result = self.attempt_once(&attempt, &token, &extra_headers).await;
            attempt.attempts_remaining -= 1;
            RequestMetrics::record_attempt(method.as_str(), result.is_ok());

            let error = match result {
                Ok(value) => {
                    if number > 1 {
                        tracing::debug!(attempt = number, "Request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            if attempt.attempts_remaining == 0 {
                RequestMetrics::record_exhausted();
                tracing::warn!(
                    attempts = number,
                    error = %error,
                    "Request failed, attempts exhausted"
                );
                return Err(error);
            }

            if method.is_idempotent() {
                tracing::debug!(
                    attempt = number,
                    remaining = attempt.attempts_remaining,
                    error = %error,
                    "Request failed, retrying"
                );
            } else {
                tracing::warn!(
                    attempt = number,
                    remaining = attempt.attempts_remaining,
                    error = %error,
                    "Retrying non-idempotent request; the server may apply it more than once"
                );
            }

            tokio::time::sleep(self.retry_delay).await;
        }
    }

    async fn attempt_once(
        &self,
        attempt: &RequestAttempt,
        token: &str,
        extra_headers: &[(String, String)],
    ) -> Result<Value, RequestError> {
        let mut request = HttpRequest {
            method: attempt.method,
            url: self.url_for(&attempt.path),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), format!("Bearer {}", token)),
            ],
            body: attempt.body.clone(),
        };
        for (name, value) in extra_headers {
            request.set_header(name.as_str(), value.as_str());
        }

        let response = self.transport.execute(&request).await?;
        normalize_response(response)
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

/// Apply the JSON response contract: the body must be JSON, and a non-2xx
/// status becomes an error carrying the server's `error` message when present.
fn normalize_response(response: HttpResponse) -> Result<Value, RequestError> {
    if !response.is_json() {
        return Err(RequestError::InvalidFormat);
    }

    if !response.is_success() {
        let message = serde_json::from_str::<Value>(&response.body)
            .ok()
            .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| format!("Request failed with status {}", response.status));
        return Err(RequestError::Status {
            status: response.status,
            message,
        });
    }

    serde_json::from_str(&response.body).map_err(|_| RequestError::InvalidFormat)
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, RequestError> {
    serde_json::from_value(value).map_err(|e| RequestError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticCredential;
    use crate::request::Method;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<HttpResponse, RequestError>>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<Result<HttpResponse, RequestError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<HttpRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, RequestError> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(RequestError::Network("script exhausted".to_string())))
        }
    }

    fn client(transport: Arc<ScriptedTransport>) -> RequestClient {
        RequestClient::new(
            &ApiConfig::default(),
            transport,
            Arc::new(StaticCredential::new(Some("secret-token".to_string()))),
        )
    }

    fn server_error(message: &str) -> Result<HttpResponse, RequestError> {
        Ok(HttpResponse::json(500, &json!({ "error": message })))
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_exactly_max_attempts_and_returns_last_error() {
        let transport = ScriptedTransport::new(vec![
            Err(RequestError::Network("connection reset".to_string())),
            server_error("database busy"),
            server_error("database down"),
            Ok(HttpResponse::json(200, &json!([]))),
        ]);
        let client = client(transport.clone());

        let err = client
            .request("/orders", RequestOptions::get(), 3)
            .await
            .unwrap_err();

        assert_eq!(transport.calls().len(), 3);
        assert_eq!(
            err,
            RequestError::Status {
                status: 500,
                message: "database down".to_string()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_succeeds_on_third_attempt() {
        let transport = ScriptedTransport::new(vec![
            server_error("try again"),
            server_error("try again"),
            Ok(HttpResponse::json(200, &json!({ "_id": "p1", "name": "Hammer" }))),
        ]);
        let client = client(transport.clone());

        let created = client
            .request("/products", RequestOptions::post(json!({ "name": "Hammer" })), 3)
            .await
            .unwrap();

        assert_eq!(created["_id"], "p1");
        let calls = transport.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|c| c.method == Method::Post));
        assert!(calls.iter().all(|c| c.body == Some(json!({ "name": "Hammer" }))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_between_attempts() {
        let transport = ScriptedTransport::new(vec![
            server_error("a"),
            server_error("b"),
            server_error("c"),
        ]);
        let client = client(transport);

        let start = tokio::time::Instant::now();
        let _ = client.request("/customers", RequestOptions::get(), 3).await;
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_tries_once() {
        let transport = ScriptedTransport::new(vec![server_error("nope")]);
        let client = client(transport.clone());

        assert!(client.request("/contacts", RequestOptions::get(), 0).await.is_err());
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_attaches_credential_and_json_headers() {
        let transport =
            ScriptedTransport::new(vec![Ok(HttpResponse::json(200, &json!({ "totalProducts": 4 })))]);
        let client = client(transport.clone());

        client.fetch("stats/dashboard").await.unwrap();

        let call = &transport.calls()[0];
        assert_eq!(call.url, "http://localhost:3000/api/stats/dashboard");
        assert_eq!(call.header("authorization"), Some("Bearer secret-token"));
        assert_eq!(call.header("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_caller_header_replaces_default() {
        let transport = ScriptedTransport::new(vec![Ok(HttpResponse::json(200, &json!({})))]);
        let client = client(transport.clone());

        let options = RequestOptions::put(json!({ "stock": 3 }))
            .header("content-type", "application/merge-patch+json")
            .header("X-Request-Source", "console");
        client.request("/products/p1", options, 1).await.unwrap();

        let call = &transport.calls()[0];
        let content_types = call
            .headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .count();
        assert_eq!(content_types, 1);
        assert_eq!(call.header("Content-Type"), Some("application/merge-patch+json"));
        assert_eq!(call.header("Authorization"), Some("Bearer secret-token"));
        assert_eq!(call.header("x-request-source"), Some("console"));
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_attempt() {
        let transport = ScriptedTransport::new(vec![]);
        let client = RequestClient::new(
            &ApiConfig::default(),
            transport.clone(),
            Arc::new(StaticCredential::new(None)),
        );

        let err = client.fetch("/orders").await.unwrap_err();
        assert_eq!(err, RequestError::Unauthorized);
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn test_non_json_response_is_invalid_format() {
        let response = HttpResponse {
            status: 200,
            content_type: Some("text/html".to_string()),
            body: "<html></html>".to_string(),
        };
        assert_eq!(normalize_response(response), Err(RequestError::InvalidFormat));
    }

    #[test]
    fn test_malformed_error_body_degrades_to_generic_message() {
        let response = HttpResponse {
            status: 503,
            content_type: Some("application/json".to_string()),
            body: "not json at all".to_string(),
        };
        let err = normalize_response(response).unwrap_err();
        assert_eq!(err.user_message(), "Request failed with status 503");
    }

    #[test]
    fn test_error_body_without_error_field() {
        let response = HttpResponse::json(404, &json!({ "message": "gone" }));
        let err = normalize_response(response).unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.user_message(), "Request failed with status 404");
    }

    #[tokio::test]
    async fn test_decode_failure_is_not_retried() {
        let transport =
            ScriptedTransport::new(vec![Ok(HttpResponse::json(200, &json!({ "unexpected": true })))]);
        let client = client(transport.clone());

        let result: Result<Vec<String>, _> = client.get_json("/orders").await;
        assert!(matches!(result, Err(RequestError::Decode(_))));
        assert_eq!(transport.calls().len(), 1);
    }
}
