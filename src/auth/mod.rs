use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod provider;

pub use provider::IdentityClient;

/// Authenticated caller, resolved from the bearer token by the identity
/// provider. Injected into request extensions by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No authorization header")]
    MissingToken,
    #[error("Invalid user token")]
    InvalidToken,
    #[error("Identity provider request failed: {0}")]
    ProviderError(#[from] reqwest::Error),
    #[error("Invalid response from identity provider: {0}")]
    InvalidResponse(String),
    #[error("Circuit breaker open: {0}")]
    CircuitBreakerOpen(String),
}

/// Seam between the auth middleware and the hosted identity provider, so the
/// middleware can be exercised with a stub in tests.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError>;
}
