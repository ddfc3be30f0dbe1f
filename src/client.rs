use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use sqlx::types::BigDecimal;
use thiserror::Error;

use crate::db::models::{Transaction, Wallet};
use crate::handlers::demo::SeedResponse;
use crate::handlers::payment::{PaymentRequest, PaymentResponse};
use crate::handlers::recharge::{IDEMPOTENCY_HEADER, RechargeRequest, RechargeResponse};
use crate::handlers::transactions::TransactionsResponse;
use crate::handlers::wallet::WalletResponse;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    Api {
        status: StatusCode,
        message: String,
        detail: serde_json::Value,
    },
}

/// Thin API client over the ledger service, holding the caller's bearer
/// token. Keeps no authoritative state: every read goes back to the service.
pub struct WalletClient {
    http: Client,
    base_url: String,
    bearer_token: String,
}

impl WalletClient {
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            bearer_token: bearer_token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.bearer_token)
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let detail: serde_json::Value = response
            .json()
            .await
            .unwrap_or_else(|_| serde_json::json!({}));
        let message = detail["error"]
            .as_str()
            .unwrap_or("unknown error")
            .to_string();

        Err(ClientError::Api {
            status,
            message,
            detail,
        })
    }

    pub async fn wallet(&self) -> Result<Wallet, ClientError> {
        let response = self
            .http
            .get(self.url("/wallet"))
            .header("Authorization", self.bearer())
            .send()
            .await?;

        let body: WalletResponse = Self::parse(response).await?;
        Ok(body.wallet)
    }

    pub async fn transactions(
        &self,
        page: i64,
        limit: i64,
        type_filter: Option<&str>,
    ) -> Result<Vec<Transaction>, ClientError> {
        let mut request = self
            .http
            .get(self.url("/transactions"))
            .header("Authorization", self.bearer())
            .query(&[("page", page), ("limit", limit)]);

        if let Some(kind) = type_filter {
            request = request.query(&[("type", kind)]);
        }

        let body: TransactionsResponse = Self::parse(request.send().await?).await?;
        Ok(body.transactions)
    }

    pub async fn recharge(
        &self,
        amount: BigDecimal,
        payment_method: &str,
        idempotency_key: Option<&str>,
    ) -> Result<RechargeResponse, ClientError> {
        let mut request = self
            .http
            .post(self.url("/recharge"))
            .header("Authorization", self.bearer())
            .json(&RechargeRequest {
                amount,
                payment_method: payment_method.to_string(),
            });

        if let Some(key) = idempotency_key {
            request = request.header(IDEMPOTENCY_HEADER, key);
        }

        Self::parse(request.send().await?).await
    }

    pub async fn payment(
        &self,
        amount: BigDecimal,
        merchant_name: Option<&str>,
        description: Option<&str>,
        idempotency_key: Option<&str>,
    ) -> Result<PaymentResponse, ClientError> {
        let mut request = self
            .http
            .post(self.url("/payment"))
            .header("Authorization", self.bearer())
            .json(&PaymentRequest {
                amount,
                merchant_name: merchant_name.map(str::to_string),
                description: description.map(str::to_string),
            });

        if let Some(key) = idempotency_key {
            request = request.header(IDEMPOTENCY_HEADER, key);
        }

        Self::parse(request.send().await?).await
    }

    pub async fn seed_demo(&self) -> Result<SeedResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/demo/seed"))
            .header("Authorization", self.bearer())
            .send()
            .await?;

        Self::parse(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let client = WalletClient::new("http://localhost:3000/", "token");
        assert_eq!(client.url("/wallet"), "http://localhost:3000/wallet");

        let client = WalletClient::new("http://localhost:3000", "token");
        assert_eq!(client.url("/wallet"), "http://localhost:3000/wallet");
    }
}
