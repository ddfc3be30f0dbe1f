use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::AppState;
use crate::auth::AuthUser;
use crate::db::models::Wallet;
use crate::error::AppError;
use crate::services::LedgerService;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WalletResponse {
    pub wallet: Wallet,
}

#[utoipa::path(
    get,
    path = "/wallet",
    responses(
        (status = 200, description = "The caller's wallet, created on first read", body = WalletResponse),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    tag = "Wallet"
)]
pub async fn get_wallet(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    let wallet = LedgerService::new(state.db.clone())
        .get_or_create_wallet(user.id)
        .await?;

    Ok(Json(WalletResponse { wallet }))
}
