use async_trait::async_trait;
use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

use super::{AuthError, AuthUser, TokenVerifier};

/// Response from the identity provider's /auth/v1/user endpoint
#[derive(Debug, Clone, Deserialize)]
struct ProviderUser {
    id: Uuid,
    email: Option<String>,
}

/// HTTP client that resolves bearer tokens against the hosted identity
/// provider.
#[derive(Clone)]
pub struct IdentityClient {
    client: Client,
    base_url: String,
    circuit_breaker: StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>,
}

impl IdentityClient {
    /// Creates a new IdentityClient with the specified base URL
    pub fn new(base_url: String) -> Self {
        Self::with_circuit_breaker(base_url, 3, 60)
    }

    /// Creates a new IdentityClient with custom circuit breaker configuration
    pub fn with_circuit_breaker(
        base_url: String,
        failure_threshold: u32,
        reset_timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        let backoff = backoff::equal_jittered(
            Duration::from_secs(reset_timeout_secs),
            Duration::from_secs(reset_timeout_secs * 2),
        );
        let policy = failure_policy::consecutive_failures(failure_threshold, backoff);
        let circuit_breaker = Config::new().failure_policy(policy).build();

        IdentityClient {
            client,
            base_url,
            circuit_breaker,
        }
    }

    /// Returns the current state of the circuit breaker
    pub fn circuit_state(&self) -> String {
        if self.circuit_breaker.is_call_permitted() {
            "closed".to_string()
        } else {
            "open".to_string()
        }
    }

    async fn get_user(&self, token: &str) -> Result<AuthUser, AuthError> {
        let url = format!("{}/auth/v1/user", self.base_url.trim_end_matches('/'));
        let client = self.client.clone();
        let bearer = format!("Bearer {}", token);

        let result = self
            .circuit_breaker
            .call(async move {
                let response = client
                    .get(&url)
                    .header("Authorization", bearer)
                    .send()
                    .await?;

                // A rejected token is a caller problem, not a provider outage;
                // it must not trip the breaker.
                if response.status() == 401 || response.status() == 403 {
                    return Ok(None);
                }

                if !response.status().is_success() {
                    return Err(AuthError::InvalidResponse(format!(
                        "provider returned status {}",
                        response.status()
                    )));
                }

                let user = response.json::<ProviderUser>().await?;
                Ok(Some(user))
            })
            .await;

        match result {
            Ok(Some(user)) => Ok(AuthUser {
                id: user.id,
                email: user.email,
            }),
            Ok(None) => Err(AuthError::InvalidToken),
            Err(FailsafeError::Rejected) => Err(AuthError::CircuitBreakerOpen(
                "identity provider circuit breaker is open".to_string(),
            )),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }
}

#[async_trait]
impl TokenVerifier for IdentityClient {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        self.get_user(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_client_creation() {
        let client = IdentityClient::new("https://auth.example.com".to_string());
        assert_eq!(client.base_url, "https://auth.example.com");
    }

    #[test]
    fn test_circuit_breaker_state() {
        let client = IdentityClient::new("https://auth.example.com".to_string());
        assert_eq!(client.circuit_state(), "closed");
    }

    #[tokio::test]
    async fn test_verify_valid_token() {
        let mut server = mockito::Server::new_async().await;

        let user_id = Uuid::new_v4();
        let body = format!(
            r#"{{"id": "{}", "email": "student@campus.edu"}}"#,
            user_id
        );

        let _mock = server
            .mock("GET", "/auth/v1/user")
            .match_header("authorization", "Bearer good-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let client = IdentityClient::new(server.url());
        let user = client.verify("good-token").await.unwrap();

        assert_eq!(user.id, user_id);
        assert_eq!(user.email.as_deref(), Some("student@campus.edu"));
    }

    #[tokio::test]
    async fn test_verify_rejected_token() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("GET", "/auth/v1/user")
            .with_status(401)
            .create_async()
            .await;

        let client = IdentityClient::new(server.url());
        let result = client.verify("bad-token").await;

        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_rejected_tokens_do_not_trip_breaker() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("GET", "/auth/v1/user")
            .with_status(401)
            .expect_at_least(4)
            .create_async()
            .await;

        let client = IdentityClient::with_circuit_breaker(server.url(), 3, 1);

        for _ in 0..4 {
            let result = client.verify("bad-token").await;
            assert!(matches!(result, Err(AuthError::InvalidToken)));
        }

        assert_eq!(client.circuit_state(), "closed");
    }

    #[tokio::test]
    async fn test_circuit_breaker_opens_after_failures() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("GET", "/auth/v1/user")
            .with_status(500)
            .expect_at_least(3)
            .create_async()
            .await;

        let client = IdentityClient::with_circuit_breaker(server.url(), 3, 60);

        for _ in 0..3 {
            let _ = client.verify("any-token").await;
        }

        let result = client.verify("any-token").await;
        assert!(matches!(result, Err(AuthError::CircuitBreakerOpen(_))));
    }
}
