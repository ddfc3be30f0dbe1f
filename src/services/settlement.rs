use sqlx::{PgPool, Postgres, Transaction as SqlxTransaction};
use tokio::time::{Duration, sleep};
use uuid::Uuid;

use crate::db::models::{RechargeOrder, Transaction};
use crate::db::queries;
use crate::error::AppError;

const BATCH_SIZE: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// Credit applied, transaction recorded, order completed.
    Credited,
    /// Invariant breach at settlement time; order marked failed.
    Rejected,
}

/// Settles pending recharge orders. The recharge_orders table is the durable
/// queue: orders survive process restarts, and `FOR UPDATE SKIP LOCKED` lets
/// several worker instances run without settling an order twice.
pub struct SettlementWorker {
    pool: PgPool,
    poll_interval: Duration,
}

impl SettlementWorker {
    pub fn new(pool: PgPool, poll_interval: Duration) -> Self {
        Self {
            pool,
            poll_interval,
        }
    }

    pub async fn run(self) {
        tracing::info!(
            poll_interval_secs = self.poll_interval.as_secs(),
            "settlement worker started"
        );

        loop {
            match self.process_due_orders().await {
                Ok(0) => {}
                Ok(settled) => tracing::info!(settled, "settled recharge orders"),
                Err(e) => tracing::error!("settlement batch error: {}", e),
            }

            sleep(self.poll_interval).await;
        }
    }

    /// Claim and settle one batch of due orders. A database failure rolls the
    /// whole batch back; the orders stay pending and are retried on the next
    /// poll.
    pub async fn process_due_orders(&self) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await?;

        let due = queries::due_orders_for_update(&mut tx, BATCH_SIZE).await?;
        if due.is_empty() {
            tx.rollback().await?;
            return Ok(0);
        }

        let claimed = due.len();
        for order in &due {
            settle_claimed_order(&mut tx, order).await?;
        }

        tx.commit().await?;
        Ok(claimed)
    }

    /// Settle one specific pending order immediately, ignoring settle_after.
    /// Used by the CLI escape hatch.
    pub async fn settle_order(&self, order_id: Uuid) -> Result<SettleOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = queries::get_pending_order_for_update(&mut tx, order_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Pending recharge order {} not found", order_id))
            })?;

        let outcome = settle_claimed_order(&mut tx, &order).await?;
        tx.commit().await?;

        Ok(outcome)
    }
}

/// Apply one claimed order: credit the wallet, record the ledger entry, flip
/// the order. The conditional credit carries the max-balance invariant, so a
/// balance that moved since the request was accepted cannot overfill the
/// wallet here.
async fn settle_claimed_order(
    tx: &mut SqlxTransaction<'_, Postgres>,
    order: &RechargeOrder,
) -> Result<SettleOutcome, AppError> {
    let wallet = match queries::get_wallet_for_update(tx, order.user_id).await? {
        Some(wallet) => wallet,
        None => {
            queries::mark_order_failed(tx, order.id, "wallet not found").await?;
            tracing::warn!(
                order_reference = %order.order_reference,
                "order failed: wallet not found"
            );
            return Ok(SettleOutcome::Rejected);
        }
    };

    match queries::apply_recharge_credit(tx, wallet.id, &order.amount).await? {
        Some(_) => {
            let record = Transaction::recharge(
                order.user_id,
                wallet.id,
                order.amount.clone(),
                &order.payment_method,
                order.order_reference.clone(),
            );
            queries::insert_transaction(tx, &record).await?;
            queries::mark_order_completed(tx, order.id).await?;

            tracing::info!(
                order_reference = %order.order_reference,
                user_id = %order.user_id,
                "recharge settled"
            );
            Ok(SettleOutcome::Credited)
        }
        None => {
            queries::mark_order_failed(tx, order.id, "max balance exceeded at settlement").await?;
            tracing::warn!(
                order_reference = %order.order_reference,
                user_id = %order.user_id,
                "order failed: max balance exceeded at settlement"
            );
            Ok(SettleOutcome::Rejected)
        }
    }
}
