use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::AdminToken;
use crate::config::{AppConfig, StoreBackend};
use crate::store::{RestAuthenticator, StoreError};

#[derive(Debug, Error)]
pub enum AuthError {
    /// Credentials refused; carries the message to show the user
    #[error("{0}")]
    Rejected(String),

    #[error("admin login is not configured")]
    NotConfigured,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Exchanges admin credentials for a token that the route guard will accept
#[async_trait]
pub trait AdminAuthenticator: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AdminToken, AuthError>;
}

/// Checks credentials against fixed configured values and hands out a random token
#[derive(Clone, Default)]
pub struct StaticAuthenticator {
    email: Option<String>,
    password: Option<String>,
}

impl StaticAuthenticator {
    pub fn new(email: Option<String>, password: Option<String>) -> Self {
        Self { email, password }
    }
}

#[async_trait]
impl AdminAuthenticator for StaticAuthenticator {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AdminToken, AuthError> {
        let (Some(expected_email), Some(expected_password)) = (&self.email, &self.password) else {
            return Err(AuthError::NotConfigured);
        };

        if email.trim() != expected_email || password != expected_password {
            warn!(email, "rejected admin login");
            return Err(AuthError::Rejected("Invalid login credentials".to_string()));
        }

        info!(email, "admin signed in");
        AdminToken::new(Uuid::new_v4().simple().to_string())
            .ok_or_else(|| AuthError::Rejected("could not issue a token".to_string()))
    }
}

/// Authenticator matching the configured store backend
pub fn authenticator_for(config: &AppConfig) -> Result<Arc<dyn AdminAuthenticator>, StoreError> {
    match config.store.backend {
        StoreBackend::Rest => Ok(Arc::new(RestAuthenticator::new(&config.store)?)),
        StoreBackend::Memory => Ok(Arc::new(StaticAuthenticator::new(
            config.security.admin_email.clone(),
            config.security.admin_password.clone(),
        ))),
    }
}
