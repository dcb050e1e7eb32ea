//! Resource API client.
//!
//! Request/response calls against the store's resource endpoints, decoupled
//! from the live channel. See `RequestClient` for the retry policy.

mod client;
mod transport;
mod types;

pub use client::RequestClient;
pub use transport::{HttpTransport, ReqwestTransport};
pub use types::{HttpRequest, HttpResponse, Method, RequestAttempt, RequestOptions};
