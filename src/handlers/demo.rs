use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::AppState;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::services;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SeedResponse {
    pub success: bool,
    pub message: String,
    pub transactions: usize,
}

/// Demo convenience: bulk-insert the fixed sample transactions for the
/// caller's wallet.
pub async fn seed_demo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    let inserted = services::seed_demo_transactions(&state.db, user.id).await?;

    Ok(Json(SeedResponse {
        success: true,
        message: format!("Created {} demo transactions", inserted.len()),
        transactions: inserted.len(),
    }))
}
