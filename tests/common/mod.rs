//! Shared harness for the integration tests.
//!
//! `FakeApi` stands in for the resource API with per-route latency so pull
//! ordering can be exercised under paused time; the live channel is an
//! in-memory connector driven from the test.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use admin_console_sync::auth::StaticCredential;
use admin_console_sync::config::{
    ApiConfig, AuthConfig, DashboardConfig, LiveConfig, Settings, TelemetryConfig,
};
use admin_console_sync::console::Console;
use admin_console_sync::error::RequestError;
use admin_console_sync::live::{MemoryAcceptor, MemoryConnector};
use admin_console_sync::notice::NoticeBoard;
use admin_console_sync::request::{HttpRequest, HttpResponse, HttpTransport, Method};

pub const BASE_URL: &str = "http://api.test";
pub const FEED_CAP: usize = 3;

#[derive(Default)]
struct Route {
    responses: VecDeque<HttpResponse>,
    delay: Duration,
}

/// Routes by method and path. Queued responses are served in order and the
/// last one repeats; unknown routes answer 404.
#[derive(Default)]
pub struct FakeApi {
    routes: Mutex<HashMap<(Method, String), Route>>,
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
            .responses
            .push_back(HttpResponse::json(status, &body));
        self
    }

    /// Delay every GET of `path`
    pub fn delay(self, path: &str, delay: Duration) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry((Method::Get, path.to_string()))
            .or_default()
            .delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        let url = format!("{}{}", BASE_URL, path);
        self.calls()
            .iter()
            .filter(|call| call.method == method && call.url == url)
            .count()
    }
}

#[async_trait]
impl HttpTransport for FakeApi {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, RequestError> {
        self.calls.lock().unwrap().push(request.clone());

        let path = request.url.trim_start_matches(BASE_URL).to_string();
        let (response, delay) = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&(request.method, path)) {
                Some(route) => {
                    let response = if route.responses.len() > 1 {
                        route.responses.pop_front()
                    } else {
                        route.responses.front().cloned()
                    };
                    (response, route.delay)
                }
                None => (None, Duration::ZERO),
            }
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(response.unwrap_or_else(|| HttpResponse::json(404, &json!({ "error": "Not found" }))))
    }
}

pub fn test_settings() -> Settings {
    Settings {
        api: ApiConfig {
            base_url: BASE_URL.to_string(),
            max_attempts: 3,
            retry_delay_ms: 1000,
            timeout_secs: 5,
        },
        live: LiveConfig {
            url: "ws://memory".to_string(),
            keepalive_interval_secs: 25,
            reconnect_delay_secs: 3,
            refresh_on_reconnect: true,
        },
        dashboard: DashboardConfig {
            activity_feed_cap: FEED_CAP,
        },
        auth: AuthConfig {
            token: Some("admin-token".to_string()),
        },
        telemetry: TelemetryConfig::default(),
    }
}

pub struct Harness {
    pub console: Console,
    pub api: Arc<FakeApi>,
    pub connector: Arc<MemoryConnector>,
    pub acceptor: MemoryAcceptor,
    pub notices: Arc<NoticeBoard>,
}

pub fn harness(api: FakeApi) -> Harness {
    harness_with(api, test_settings())
}

pub fn harness_with(api: FakeApi, settings: Settings) -> Harness {
    let api = Arc::new(api);
    let (connector, acceptor) = MemoryConnector::new();
    let connector = Arc::new(connector);
    let notices = Arc::new(NoticeBoard::new());
    let credentials = Arc::new(StaticCredential::new(settings.auth.token.clone()));

    let console = Console::new(
        settings,
        api.clone(),
        connector.clone(),
        credentials,
        notices.clone(),
    );

    Harness {
        console,
        api,
        connector,
        acceptor,
        notices,
    }
}

/// Dashboard pulls with a single activity entry
pub fn dashboard_api() -> FakeApi {
    FakeApi::new()
        .respond(
            "/stats/dashboard",
            200,
            json!({ "totalValue": 1200.0, "totalCustomers": 4, "totalInquiries": 1, "totalProducts": 7 }),
        )
        .respond(
            "/activity/recent",
            200,
            json!([
                { "type": "order", "message": "Order #1 placed", "timestamp": "2024-03-01T09:00:00Z" },
                { "type": "customer", "timestamp": "2024-03-01T08:00:00Z" }
            ]),
        )
}

/// Poll `condition` while letting background tasks run
pub async fn eventually<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
