use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::AppState;
use crate::auth::AuthUser;
use crate::db::models::Transaction;
use crate::error::AppError;
use crate::services::LedgerService;
use crate::services::ledger::DEFAULT_PAGE_SIZE;

#[derive(Debug, Deserialize)]
pub struct TransactionListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "type")]
    pub type_filter: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<TransactionListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let transactions = LedgerService::new(state.db.clone())
        .list_transactions(
            user.id,
            query.type_filter.as_deref(),
            query.page.unwrap_or(1),
            query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await?;

    Ok(Json(TransactionsResponse { transactions }))
}
