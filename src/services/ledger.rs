use bigdecimal::BigDecimal;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{RechargeOrder, Transaction, Wallet};
use crate::db::queries;
use crate::error::AppError;
use crate::utils::reference;
use crate::validation;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// The wallet ledger. Every operation treats the database as the sole source
/// of truth; no wallet state is cached across calls.
pub struct LedgerService {
    pool: PgPool,
}

impl LedgerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Read the caller's wallet, creating a default-valued one on first use.
    pub async fn get_or_create_wallet(&self, user_id: Uuid) -> Result<Wallet, AppError> {
        if let Some(wallet) = queries::get_wallet_by_user(&self.pool, user_id).await? {
            return Ok(wallet);
        }

        tracing::info!(user_id = %user_id, "creating wallet");
        if let Some(wallet) = queries::insert_wallet(&self.pool, Uuid::new_v4(), user_id).await? {
            return Ok(wallet);
        }

        // Lost a concurrent create race; the row exists now.
        queries::get_wallet_by_user(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::Internal("wallet creation raced but row is missing".to_string()))
    }

    /// Newest-first page of the caller's ledger, optionally filtered by type.
    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        type_filter: Option<&str>,
        page: i64,
        limit: i64,
    ) -> Result<Vec<Transaction>, AppError> {
        let type_filter = match type_filter {
            None | Some("all") => None,
            Some(kind) => {
                validation::validate_type_filter(kind)
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                Some(kind)
            }
        };

        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1) * limit;

        let transactions =
            queries::list_transactions(&self.pool, user_id, type_filter, limit, offset).await?;

        Ok(transactions)
    }

    /// Accept a top-up request. The response is immediate; the credit itself
    /// lands when the settlement worker picks the order up.
    pub async fn recharge(
        &self,
        user_id: Uuid,
        amount: BigDecimal,
        payment_method: &str,
        settle_delay_secs: u64,
    ) -> Result<RechargeOrder, AppError> {
        validation::validate_recharge_amount(&amount)
            .map_err(|e| AppError::Validation(e.to_string()))?;
        validation::validate_payment_method(payment_method)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let wallet = queries::get_wallet_by_user(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Wallet not found".to_string()))?;

        // Early rejection only. The settlement write re-checks the invariant
        // atomically, so a stale read here cannot overfill the wallet.
        if &wallet.balance + &amount > wallet.max_balance {
            return Err(AppError::MaxBalanceExceeded {
                current_balance: wallet.balance,
                max_balance: wallet.max_balance,
            });
        }

        let order = RechargeOrder::new(
            user_id,
            amount,
            payment_method.to_string(),
            reference::order_reference(),
            Utc::now() + Duration::seconds(settle_delay_secs as i64),
        );

        let order = queries::insert_recharge_order(&self.pool, &order).await?;

        tracing::info!(
            user_id = %user_id,
            order_reference = %order.order_reference,
            "recharge order accepted"
        );

        Ok(order)
    }

    /// Debit the wallet for a purchase. The balance/daily-limit checks and the
    /// ledger write share one transaction holding the wallet row lock, so two
    /// concurrent payments cannot both pass the same pre-update check.
    pub async fn payment(
        &self,
        user_id: Uuid,
        amount: BigDecimal,
        merchant_name: Option<String>,
        description: Option<String>,
    ) -> Result<Transaction, AppError> {
        validation::validate_positive_amount(&amount)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let merchant_name = merchant_name
            .map(|name| validation::sanitize_string(&name))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Unknown Merchant".to_string());
        validation::validate_max_len(
            "merchant_name",
            &merchant_name,
            validation::MERCHANT_NAME_MAX_LEN,
        )
        .map_err(|e| AppError::Validation(e.to_string()))?;

        let description = description
            .map(|text| validation::sanitize_string(&text))
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| "Payment transaction".to_string());
        validation::validate_max_len(
            "description",
            &description,
            validation::DESCRIPTION_MAX_LEN,
        )
        .map_err(|e| AppError::Validation(e.to_string()))?;

        let mut tx = self.pool.begin().await?;

        let wallet = queries::get_wallet_for_update(&mut tx, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Wallet not found".to_string()))?;

        if wallet.balance < amount {
            return Err(AppError::InsufficientBalance {
                current_balance: wallet.balance,
                required_amount: amount,
            });
        }

        let day_start = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is a valid time")
            .and_utc();
        let today_spent =
            queries::sum_completed_payments_since(&mut tx, user_id, day_start).await?;

        if &today_spent + &amount > wallet.daily_limit {
            let remaining_limit = &wallet.daily_limit - &today_spent;
            return Err(AppError::DailyLimitExceeded {
                today_spent,
                daily_limit: wallet.daily_limit,
                remaining_limit,
            });
        }

        let record = Transaction::payment(
            user_id,
            wallet.id,
            amount.clone(),
            merchant_name,
            description,
            reference::payment_reference(),
        );
        let inserted = queries::insert_transaction(&mut tx, &record).await?;

        queries::apply_payment_debit(&mut tx, wallet.id, &amount)
            .await?
            .ok_or_else(|| AppError::Internal("wallet debit failed".to_string()))?;

        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            transaction_id = %inserted.id,
            "payment completed"
        );

        Ok(inserted)
    }
}
