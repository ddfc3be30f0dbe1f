use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bigdecimal::BigDecimal;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Insufficient balance")]
    InsufficientBalance {
        current_balance: BigDecimal,
        required_amount: BigDecimal,
    },

    #[error("Payment would exceed daily spending limit of {daily_limit}")]
    DailyLimitExceeded {
        today_spent: BigDecimal,
        daily_limit: BigDecimal,
        remaining_limit: BigDecimal,
    },

    #[error("Recharge would exceed maximum balance limit of {max_balance}")]
    MaxBalanceExceeded {
        current_balance: BigDecimal,
        max_balance: BigDecimal,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InsufficientBalance { .. } => StatusCode::BAD_REQUEST,
            AppError::DailyLimitExceeded { .. } => StatusCode::BAD_REQUEST,
            AppError::MaxBalanceExceeded { .. } => StatusCode::BAD_REQUEST,
        }
    }

    /// Variant-specific fields merged into the error payload.
    fn detail(&self) -> serde_json::Value {
        match self {
            AppError::InsufficientBalance {
                current_balance,
                required_amount,
            } => json!({
                "current_balance": current_balance,
                "required_amount": required_amount,
            }),
            AppError::DailyLimitExceeded {
                today_spent,
                daily_limit,
                remaining_limit,
            } => json!({
                "today_spent": today_spent,
                "daily_limit": daily_limit,
                "remaining_limit": remaining_limit,
            }),
            AppError::MaxBalanceExceeded {
                current_balance,
                max_balance,
            } => json!({
                "current_balance": current_balance,
                "max_balance": max_balance,
            }),
            _ => json!({}),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = self.detail();
        let mut body = json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        if let (Some(base), serde_json::Value::Object(extra)) = (body.as_object_mut(), detail) {
            base.extend(extra);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_validation_error_status_code() {
        let error = AppError::Validation("Invalid amount".to_string());
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_error_status_code() {
        let error = AppError::NotFound("Wallet not found".to_string());
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_database_error_status_code() {
        let error = AppError::Database(sqlx::Error::RowNotFound);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unauthorized_error_status_code() {
        let error = AppError::Unauthorized("Invalid user token".to_string());
        assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_conflict_error_status_code() {
        let error = AppError::Conflict("request in flight".to_string());
        assert_eq!(error.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_domain_errors_are_bad_requests() {
        let error = AppError::InsufficientBalance {
            current_balance: BigDecimal::from(100),
            required_amount: BigDecimal::from(250),
        };
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);

        let error = AppError::MaxBalanceExceeded {
            current_balance: BigDecimal::from(9800),
            max_balance: BigDecimal::from(10000),
        };
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_daily_limit_detail_fields() {
        let error = AppError::DailyLimitExceeded {
            today_spent: BigDecimal::from(1900),
            daily_limit: BigDecimal::from(2000),
            remaining_limit: BigDecimal::from(100),
        };

        let detail = error.detail();
        assert_eq!(
            detail["remaining_limit"],
            serde_json::to_value(BigDecimal::from(100)).unwrap()
        );
        assert_eq!(
            detail["daily_limit"],
            serde_json::to_value(BigDecimal::from(2000)).unwrap()
        );
    }

    #[test]
    fn test_insufficient_balance_detail_fields() {
        let error = AppError::InsufficientBalance {
            current_balance: BigDecimal::from_str("10.50").unwrap(),
            required_amount: BigDecimal::from(45),
        };

        let detail = error.detail();
        assert!(detail.get("current_balance").is_some());
        assert!(detail.get("required_amount").is_some());
    }

    #[tokio::test]
    async fn test_validation_error_response() {
        let error = AppError::Validation("Invalid amount".to_string());
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_not_found_error_response() {
        let error = AppError::NotFound("Wallet not found".to_string());
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
