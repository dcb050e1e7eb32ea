//! Credential boundary.
//!
//! Obtaining the bearer token (login, session bootstrap) happens outside the
//! core. The core only asks a `CredentialProvider` for the current token and
//! attaches it to every resource API call.

mod gate;

use std::sync::RwLock;

pub use gate::AdminGate;

/// Supplies the bearer credential for outbound calls
pub trait CredentialProvider: Send + Sync {
    /// Current token, or `None` when the operator is not signed in
    fn bearer_token(&self) -> Option<String>;
}

/// Credential held in memory, seeded from configuration
#[derive(Debug, Default)]
pub struct StaticCredential {
    token: RwLock<Option<String>>,
}

impl StaticCredential {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token.filter(|t| !t.trim().is_empty())),
        }
    }

    /// Drop the credential, e.g. after the server rejected it
    pub fn clear(&self) {
        let mut token = self
            .token
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *token = None;
    }
}

impl CredentialProvider for StaticCredential {
    fn bearer_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}
