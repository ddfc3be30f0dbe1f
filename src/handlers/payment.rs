use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::AppState;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::handlers::recharge::IDEMPOTENCY_HEADER;
use crate::services::{IdempotencyService, IdempotencyStatus, LedgerService};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentRequest {
    #[schema(value_type = f64)]
    pub amount: BigDecimal,
    pub merchant_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub success: bool,
    pub transaction_id: Uuid,
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/payment",
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Payment completed and wallet debited", body = PaymentResponse),
        (status = 400, description = "Invalid amount, insufficient balance or daily limit exceeded"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Wallet not found")
    ),
    tag = "Wallet"
)]
pub async fn payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    headers: HeaderMap,
    Json(req): Json<PaymentRequest>,
) -> Result<Response, AppError> {
    let ledger = LedgerService::new(state.db.clone());
    let idempotency_key = headers
        .get(IDEMPOTENCY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    let key = match idempotency_key {
        None => {
            let transaction = ledger
                .payment(
                    user.id,
                    req.amount.clone(),
                    req.merchant_name.clone(),
                    req.description.clone(),
                )
                .await?;
            return Ok(Json(success_response(transaction.id)).into_response());
        }
        Some(key) => key,
    };

    let store = IdempotencyService::new(state.db.clone());
    let request_hash = IdempotencyService::fingerprint("payment", &req)?;

    match store.check(user.id, &key, &request_hash).await? {
        IdempotencyStatus::New => {
            let result = ledger
                .payment(
                    user.id,
                    req.amount.clone(),
                    req.merchant_name.clone(),
                    req.description.clone(),
                )
                .await;

            match result {
                Ok(transaction) => {
                    let response = success_response(transaction.id);
                    let body = serde_json::to_value(&response)
                        .map_err(|e| AppError::Internal(e.to_string()))?;
                    store
                        .store_response(user.id, &key, StatusCode::OK.as_u16(), &body)
                        .await?;
                    Ok(Json(response).into_response())
                }
                Err(e) => {
                    if let Err(release_err) = store.release(user.id, &key).await {
                        tracing::error!("failed to release idempotency key: {}", release_err);
                    }
                    Err(e)
                }
            }
        }
        IdempotencyStatus::Completed { status, body } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
            Ok((status, Json(body)).into_response())
        }
        IdempotencyStatus::Processing => Err(AppError::Conflict(
            "Request with this idempotency key is already being processed".to_string(),
        )),
        IdempotencyStatus::Mismatch => Err(AppError::Validation(
            "Idempotency key reused with a different payload".to_string(),
        )),
    }
}

fn success_response(transaction_id: Uuid) -> PaymentResponse {
    PaymentResponse {
        success: true,
        transaction_id,
        message: "Payment successful".to_string(),
    }
}
