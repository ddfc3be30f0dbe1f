use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use utoipa::ToSchema;

use crate::AppState;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::services::{IdempotencyService, IdempotencyStatus, LedgerService};

pub const IDEMPOTENCY_HEADER: &str = "x-idempotency-key";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RechargeRequest {
    #[schema(value_type = f64)]
    pub amount: BigDecimal,
    pub payment_method: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RechargeResponse {
    pub success: bool,
    pub order_reference: String,
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/recharge",
    request_body = RechargeRequest,
    responses(
        (status = 200, description = "Recharge order accepted for settlement", body = RechargeResponse),
        (status = 400, description = "Amount out of range or max balance exceeded"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Wallet not found")
    ),
    tag = "Wallet"
)]
pub async fn recharge(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    headers: HeaderMap,
    Json(req): Json<RechargeRequest>,
) -> Result<Response, AppError> {
    let ledger = LedgerService::new(state.db.clone());
    let idempotency_key = headers
        .get(IDEMPOTENCY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    let key = match idempotency_key {
        None => {
            let order = ledger
                .recharge(
                    user.id,
                    req.amount.clone(),
                    &req.payment_method,
                    state.config.settlement_delay_secs,
                )
                .await?;
            return Ok(Json(success_response(order.order_reference)).into_response());
        }
        Some(key) => key,
    };

    let store = IdempotencyService::new(state.db.clone());
    let request_hash = IdempotencyService::fingerprint("recharge", &req)?;

    match store.check(user.id, &key, &request_hash).await? {
        IdempotencyStatus::New => {
            let result = ledger
                .recharge(
                    user.id,
                    req.amount.clone(),
                    &req.payment_method,
                    state.config.settlement_delay_secs,
                )
                .await;

            match result {
                Ok(order) => {
                    let response = success_response(order.order_reference);
                    let body = serde_json::to_value(&response)
                        .map_err(|e| AppError::Internal(e.to_string()))?;
                    store
                        .store_response(user.id, &key, StatusCode::OK.as_u16(), &body)
                        .await?;
                    Ok(Json(response).into_response())
                }
                Err(e) => {
                    // Free the key so the client can retry after fixing the
                    // request.
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

fn success_response(order_reference: String) -> RechargeResponse {
    RechargeResponse {
        success: true,
        order_reference,
        message: "Recharge initiated successfully. Amount will be credited shortly.".to_string(),
    }
}
