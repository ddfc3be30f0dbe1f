use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::queries;
use crate::error::AppError;

/// Postgres-backed deduplication for retried recharge/payment requests,
/// keyed by (user, X-Idempotency-Key) with a uniqueness constraint. The row
/// doubles as an in-flight marker: response_body stays NULL until the first
/// request finishes.
#[derive(Clone)]
pub struct IdempotencyService {
    pool: PgPool,
}

#[derive(Debug)]
pub enum IdempotencyStatus {
    /// Key claimed by this request; proceed with the operation.
    New,
    /// Another request with this key is still in flight.
    Processing,
    /// The operation already ran; replay the stored response.
    Completed { status: u16, body: serde_json::Value },
    /// Key reused with a different request payload.
    Mismatch,
}

impl IdempotencyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Request fingerprint: SHA-256 over the operation name and the
    /// serialized payload, so the same key cannot silently cover two
    /// different requests.
    pub fn fingerprint<T: Serialize>(operation: &str, payload: &T) -> Result<String, AppError> {
        let body =
            serde_json::to_vec(payload).map_err(|e| AppError::Internal(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(operation.as_bytes());
        hasher.update(&body);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Claim the key or report what happened to its first use.
    pub async fn check(
        &self,
        user_id: Uuid,
        key: &str,
        request_hash: &str,
    ) -> Result<IdempotencyStatus, AppError> {
        if queries::claim_idempotency_key(&self.pool, user_id, key, request_hash)
            .await?
            .is_some()
        {
            return Ok(IdempotencyStatus::New);
        }

        let record = match queries::get_idempotency_record(&self.pool, user_id, key).await? {
            Some(record) => record,
            // The first request failed and released the key between our
            // insert and this read; the caller should retry.
            None => return Ok(IdempotencyStatus::Processing),
        };

        if record.request_hash != request_hash {
            return Ok(IdempotencyStatus::Mismatch);
        }

        match (record.response_status, record.response_body) {
            (Some(status), Some(body)) => Ok(IdempotencyStatus::Completed {
                status: status as u16,
                body,
            }),
            _ => Ok(IdempotencyStatus::Processing),
        }
    }

    /// Store the first successful response for future replays.
    pub async fn store_response(
        &self,
        user_id: Uuid,
        key: &str,
        status: u16,
        body: &serde_json::Value,
    ) -> Result<(), AppError> {
        queries::store_idempotency_response(&self.pool, user_id, key, status as i32, body).await?;
        Ok(())
    }

    /// Release the claim after a failed operation so the client can retry
    /// with the same key.
    pub async fn release(&self, user_id: Uuid, key: &str) -> Result<(), AppError> {
        queries::release_idempotency_key(&self.pool, user_id, key).await?;
        Ok(())
    }
}
