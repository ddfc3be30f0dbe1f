use bigdecimal::BigDecimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{
    STATUS_COMPLETED, TYPE_PAYMENT, TYPE_RECHARGE, Transaction, WALLET_MERCHANT,
};
use crate::db::queries;
use crate::error::AppError;

struct DemoTemplate {
    kind: &'static str,
    amount: i64,
    merchant_name: &'static str,
    description: &'static str,
    payment_method: Option<&'static str>,
    reference_id: &'static str,
}

const DEMO_TRANSACTIONS: &[DemoTemplate] = &[
    DemoTemplate {
        kind: TYPE_RECHARGE,
        amount: 1000,
        merchant_name: WALLET_MERCHANT,
        description: "Initial wallet setup bonus",
        payment_method: Some("demo"),
        reference_id: "DEMO_RECHARGE_001",
    },
    DemoTemplate {
        kind: TYPE_PAYMENT,
        amount: 45,
        merchant_name: "Campus Cafeteria",
        description: "Lunch payment",
        payment_method: None,
        reference_id: "DEMO_PAYMENT_001",
    },
    DemoTemplate {
        kind: TYPE_PAYMENT,
        amount: 25,
        merchant_name: "Library",
        description: "Book fine payment",
        payment_method: None,
        reference_id: "DEMO_PAYMENT_002",
    },
    DemoTemplate {
        kind: TYPE_RECHARGE,
        amount: 500,
        merchant_name: WALLET_MERCHANT,
        description: "Wallet recharge via UPI",
        payment_method: Some("upi"),
        reference_id: "DEMO_RECHARGE_002",
    },
    DemoTemplate {
        kind: TYPE_PAYMENT,
        amount: 150,
        merchant_name: "Bookstore",
        description: "Textbook purchase",
        payment_method: None,
        reference_id: "DEMO_PAYMENT_003",
    },
];

/// Bulk-insert the canned sample transactions for a user's wallet. Purely
/// additive demo data: wallet aggregates are left untouched and nothing is
/// validated against existing rows.
pub async fn seed_demo_transactions(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<Transaction>, AppError> {
    let wallet = queries::get_wallet_by_user(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Wallet not found".to_string()))?;

    let mut tx = pool.begin().await?;
    let mut inserted = Vec::with_capacity(DEMO_TRANSACTIONS.len());

    for template in DEMO_TRANSACTIONS {
        let record = Transaction::new(
            user_id,
            wallet.id,
            template.kind,
            BigDecimal::from(template.amount),
            STATUS_COMPLETED,
            Some(template.merchant_name.to_string()),
            Some(template.description.to_string()),
            template.payment_method.map(str::to_string),
            Some(template.reference_id.to_string()),
            None,
        );
        inserted.push(queries::insert_transaction(&mut tx, &record).await?);
    }

    tx.commit().await?;

    tracing::info!(
        user_id = %user_id,
        count = inserted.len(),
        "created demo transactions"
    );

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_set_has_two_recharges_and_three_payments() {
        let recharges = DEMO_TRANSACTIONS
            .iter()
            .filter(|t| t.kind == TYPE_RECHARGE)
            .count();
        let payments = DEMO_TRANSACTIONS
            .iter()
            .filter(|t| t.kind == TYPE_PAYMENT)
            .count();

        assert_eq!(recharges, 2);
        assert_eq!(payments, 3);
        assert_eq!(DEMO_TRANSACTIONS.len(), 5);
    }

    #[test]
    fn demo_references_are_unique() {
        let mut refs: Vec<_> = DEMO_TRANSACTIONS.iter().map(|t| t.reference_id).collect();
        refs.sort_unstable();
        refs.dedup();
        assert_eq!(refs.len(), DEMO_TRANSACTIONS.len());
    }
}
