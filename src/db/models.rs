use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::BigDecimal;
use utoipa::ToSchema;
use uuid::Uuid;

pub const TYPE_RECHARGE: &str = "recharge";
pub const TYPE_PAYMENT: &str = "payment";

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_FAILED: &str = "failed";

pub const WALLET_MERCHANT: &str = "Fingerpays Wallet";

/// One wallet per user, enforced by a uniqueness constraint on user_id.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(value_type = f64)]
    pub balance: BigDecimal,
    #[schema(value_type = f64)]
    pub total_recharged: BigDecimal,
    #[schema(value_type = f64)]
    pub total_spent: BigDecimal,
    #[schema(value_type = f64)]
    pub monthly_spent: BigDecimal,
    pub month_anchor: DateTime<Utc>,
    #[schema(value_type = f64)]
    pub daily_limit: BigDecimal,
    #[schema(value_type = f64)]
    pub max_balance: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Immutable ledger entry. Reversals are new rows, never edits.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub wallet_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    #[schema(value_type = f64)]
    pub amount: BigDecimal,
    pub status: String,
    pub merchant_name: Option<String>,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub reference_id: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: Uuid,
        wallet_id: Uuid,
        kind: &str,
        amount: BigDecimal,
        status: &str,
        merchant_name: Option<String>,
        description: Option<String>,
        payment_method: Option<String>,
        reference_id: Option<String>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            wallet_id,
            kind: kind.to_string(),
            amount,
            status: status.to_string(),
            merchant_name,
            description,
            payment_method,
            reference_id,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn payment(
        user_id: Uuid,
        wallet_id: Uuid,
        amount: BigDecimal,
        merchant_name: String,
        description: String,
        reference_id: String,
    ) -> Self {
        Self::new(
            user_id,
            wallet_id,
            TYPE_PAYMENT,
            amount,
            STATUS_COMPLETED,
            Some(merchant_name),
            Some(description),
            None,
            Some(reference_id),
            None,
        )
    }

    pub fn recharge(
        user_id: Uuid,
        wallet_id: Uuid,
        amount: BigDecimal,
        payment_method: &str,
        reference_id: String,
    ) -> Self {
        Self::new(
            user_id,
            wallet_id,
            TYPE_RECHARGE,
            amount,
            STATUS_COMPLETED,
            Some(WALLET_MERCHANT.to_string()),
            Some(format!("Wallet recharge via {}", payment_method)),
            Some(payment_method.to_string()),
            Some(reference_id),
            None,
        )
    }
}

/// A requested top-up waiting for settlement. Doubles as the durable work
/// queue: the settlement worker picks up pending rows whose settle_after has
/// passed.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RechargeOrder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: BigDecimal,
    pub payment_method: String,
    pub order_reference: String,
    pub status: String,
    pub settle_after: DateTime<Utc>,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RechargeOrder {
    pub fn new(
        user_id: Uuid,
        amount: BigDecimal,
        payment_method: String,
        order_reference: String,
        settle_after: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            amount,
            payment_method,
            order_reference,
            status: STATUS_PENDING.to_string(),
            settle_after,
            attempts: 0,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// User-entered identity fields; never touched by ledger logic.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub branch: Option<String>,
    pub year_of_study: Option<i32>,
    pub student_id: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Deduplication record for retried recharge/payment requests.
/// response_body stays NULL while the first request is in flight.
#[derive(Debug, Clone, FromRow)]
pub struct IdempotencyRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub idempotency_key: String,
    pub request_hash: String,
    pub response_status: Option<i32>,
    pub response_body: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn payment_transaction_is_completed() {
        let user_id = Uuid::new_v4();
        let wallet_id = Uuid::new_v4();
        let tx = Transaction::payment(
            user_id,
            wallet_id,
            BigDecimal::from_str("45.00").unwrap(),
            "Campus Cafeteria".to_string(),
            "Lunch payment".to_string(),
            "PAY_1_abc".to_string(),
        );

        assert_eq!(tx.kind, TYPE_PAYMENT);
        assert_eq!(tx.status, STATUS_COMPLETED);
        assert_eq!(tx.user_id, user_id);
        assert_eq!(tx.wallet_id, wallet_id);
        assert_eq!(tx.payment_method, None);
        assert_eq!(tx.reference_id.as_deref(), Some("PAY_1_abc"));
    }

    #[test]
    fn recharge_transaction_describes_payment_method() {
        let tx = Transaction::recharge(
            Uuid::new_v4(),
            Uuid::new_v4(),
            BigDecimal::from(500),
            "upi",
            "ORDER_1_xyz".to_string(),
        );

        assert_eq!(tx.kind, TYPE_RECHARGE);
        assert_eq!(tx.merchant_name.as_deref(), Some(WALLET_MERCHANT));
        assert_eq!(tx.description.as_deref(), Some("Wallet recharge via upi"));
        assert_eq!(tx.payment_method.as_deref(), Some("upi"));
    }

    #[test]
    fn new_order_starts_pending_with_zero_attempts() {
        let order = RechargeOrder::new(
            Uuid::new_v4(),
            BigDecimal::from(500),
            "upi".to_string(),
            "ORDER_1_xyz".to_string(),
            Utc::now(),
        );

        assert_eq!(order.status, STATUS_PENDING);
        assert_eq!(order.attempts, 0);
        assert!(order.last_error.is_none());
    }

    #[test]
    fn transaction_serializes_kind_as_type() {
        let tx = Transaction::payment(
            Uuid::new_v4(),
            Uuid::new_v4(),
            BigDecimal::from(10),
            "Library".to_string(),
            "Book fine payment".to_string(),
            "PAY_2_def".to_string(),
        );

        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["type"], "payment");
        assert!(value.get("kind").is_none());
    }
}
