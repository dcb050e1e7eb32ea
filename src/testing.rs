//! Shared fakes for unit tests

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::auth::StaticCredential;
use crate::config::ApiConfig;
use crate::error::RequestError;
use crate::notice::NoticeSink;
use crate::request::{HttpRequest, HttpResponse, HttpTransport, Method, RequestClient};
use crate::view::{SectionCoordinator, SectionLoader};

pub const TEST_BASE_URL: &str = "http://api.test";

/// Answers by method and path. Queued responses are served in order and the
/// last one repeats; unknown routes get a 404.
#[derive(Default)]
pub struct FakeApi {
    routes: Mutex<HashMap<(Method, String), VecDeque<HttpResponse>>>,
    calls: Mutex<Vec<HttpRequest>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, path: &str, status: u16, body: Value) -> Self {
        self.respond_to(Method::Get, path, status, body)
    }

    pub fn respond_to(self, method: Method, path: &str, status: u16, body: Value) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(HttpResponse::json(status, &body));
        self
    }

    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|call| call.url.trim_start_matches(TEST_BASE_URL).to_string())
            .collect()
    }
}

#[async_trait]
impl HttpTransport for FakeApi {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, RequestError> {
        self.calls.lock().unwrap().push(request.clone());

        let path = request.url.trim_start_matches(TEST_BASE_URL).to_string();
        let mut routes = self.routes.lock().unwrap();
        let response = match routes.get_mut(&(request.method, path)) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or_else(|| HttpResponse::json(404, &json!({ "error": "Not found" }))))
    }
}

/// Request client with a single attempt and no retry delay
pub fn single_attempt_client(api: Arc<FakeApi>) -> RequestClient {
    let config = ApiConfig {
        base_url: TEST_BASE_URL.to_string(),
        max_attempts: 1,
        retry_delay_ms: 0,
        ..Default::default()
    };
    RequestClient::new(
        &config,
        api,
        Arc::new(StaticCredential::new(Some("test-token".to_string()))),
    )
}

pub fn offline_coordinator(
    api: FakeApi,
    notices: Arc<dyn NoticeSink>,
    feed_cap: usize,
) -> SectionCoordinator {
    let requests = Arc::new(single_attempt_client(Arc::new(api)));
    SectionCoordinator::new(SectionLoader::new(requests, feed_cap), notices)
}
