use std::sync::Arc;

use crate::error::{AuthError, RequestError};
use crate::request::{RequestClient, RequestOptions};

const VERIFY_ADMIN_PATH: &str = "/verify-admin";

/// Confirms the current credential grants admin access before the console
/// starts any live work.
pub struct AdminGate {
    requests: Arc<RequestClient>,
}

impl AdminGate {
    pub fn new(requests: Arc<RequestClient>) -> Self {
        Self { requests }
    }

    /// Single attempt: a rejected credential will not become valid on retry
    #[tracing::instrument(name = "auth.verify_admin", skip(self))]
    pub async fn verify(&self) -> Result<(), AuthError> {
        match self
            .requests
            .request(VERIFY_ADMIN_PATH, RequestOptions::get(), 1)
            .await
        {
            Ok(_) => {
                tracing::info!("Admin access verified");
                Ok(())
            }
            Err(RequestError::Unauthorized) => Err(AuthError::MissingCredential),
            Err(e) => {
                tracing::warn!(error = %e, "Admin access verification failed");
                Err(AuthError::Rejected(e.user_message()))
            }
        }
    }
}
