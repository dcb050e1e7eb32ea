//! Error taxonomy for the live-sync core.
//!
//! - `TransportError`: live channel open/send/receive failures. Contained in the
//!   connection manager, they only drive channel state and reconnects.
//! - `ParseError`: a live frame that could not be decoded. Logged and dropped.
//! - `RequestError`: a resource API call that failed after all attempts. Surfaced
//!   to the section controller that issued it.
//! - `AuthError`: admin gate failures at startup.
//! - `ConsoleError`: umbrella for the binary's startup path.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Failed to open live channel: {0}")]
    Open(String),

    #[error("Failed to send on live channel: {0}")]
    Send(String),

    #[error("Failed to receive from live channel: {0}")]
    Receive(String),
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed live message: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response. `message` is the server's `error` field when present.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The response did not carry a JSON body
    #[error("Invalid response format")]
    InvalidFormat,

    /// The JSON body did not match the expected record shape
    #[error("Unexpected response shape: {0}")]
    Decode(String),

    #[error("Missing credential")]
    Unauthorized,
}

impl RequestError {
    /// Human-readable message suitable for a user-facing notice
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// HTTP status carried by the error, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the credential was absent or rejected
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized)
            || matches!(self.status(), Some(401) | Some(403))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No credential available")]
    MissingCredential,

    #[error("Admin access rejected: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
