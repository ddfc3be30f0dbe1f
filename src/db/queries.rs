use chrono::{DateTime, Utc};
use sqlx::types::BigDecimal;
use sqlx::{PgPool, Postgres, Result, Transaction as SqlxTransaction};
use uuid::Uuid;

use crate::db::models::{IdempotencyRecord, Profile, RechargeOrder, Transaction, Wallet};

// --- Wallet queries ---

pub async fn get_wallet_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Wallet>> {
    sqlx::query_as::<_, Wallet>("SELECT * FROM wallets WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Lazy wallet creation. ON CONFLICT DO NOTHING makes a concurrent
/// double-create resolve to a single row; the loser re-reads.
pub async fn insert_wallet(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<Option<Wallet>> {
    sqlx::query_as::<_, Wallet>(
        r#"
        INSERT INTO wallets (id, user_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn get_wallet_for_update(
    executor: &mut SqlxTransaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<Option<Wallet>> {
    sqlx::query_as::<_, Wallet>("SELECT * FROM wallets WHERE user_id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(&mut **executor)
        .await
}

/// Debit for a payment. The balance check lives in the WHERE clause so the
/// write itself enforces the non-negative invariant; the monthly aggregate
/// rolls over when the calendar month has changed since the last write.
pub async fn apply_payment_debit(
    executor: &mut SqlxTransaction<'_, Postgres>,
    wallet_id: Uuid,
    amount: &BigDecimal,
) -> Result<Option<Wallet>> {
    sqlx::query_as::<_, Wallet>(
        r#"
        UPDATE wallets
        SET balance = balance - $2,
            total_spent = total_spent + $2,
            monthly_spent = CASE
                WHEN month_anchor = date_trunc('month', now()) THEN monthly_spent + $2
                ELSE $2
            END,
            month_anchor = date_trunc('month', now()),
            updated_at = now()
        WHERE id = $1 AND balance >= $2
        RETURNING *
        "#,
    )
    .bind(wallet_id)
    .bind(amount)
    .fetch_optional(&mut **executor)
    .await
}

/// Credit for a settled recharge. The max-balance invariant is expressed in
/// the write, closing the read-check-write race.
pub async fn apply_recharge_credit(
    executor: &mut SqlxTransaction<'_, Postgres>,
    wallet_id: Uuid,
    amount: &BigDecimal,
) -> Result<Option<Wallet>> {
    sqlx::query_as::<_, Wallet>(
        r#"
        UPDATE wallets
        SET balance = balance + $2,
            total_recharged = total_recharged + $2,
            updated_at = now()
        WHERE id = $1 AND balance + $2 <= max_balance
        RETURNING *
        "#,
    )
    .bind(wallet_id)
    .bind(amount)
    .fetch_optional(&mut **executor)
    .await
}

// --- Transaction queries ---

pub async fn insert_transaction(
    executor: &mut SqlxTransaction<'_, Postgres>,
    tx: &Transaction,
) -> Result<Transaction> {
    sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (
            id, user_id, wallet_id, type, amount, status,
            merchant_name, description, payment_method, reference_id, metadata,
            created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING *
        "#,
    )
    .bind(tx.id)
    .bind(tx.user_id)
    .bind(tx.wallet_id)
    .bind(&tx.kind)
    .bind(&tx.amount)
    .bind(&tx.status)
    .bind(&tx.merchant_name)
    .bind(&tx.description)
    .bind(&tx.payment_method)
    .bind(&tx.reference_id)
    .bind(&tx.metadata)
    .bind(tx.created_at)
    .bind(tx.updated_at)
    .fetch_one(&mut **executor)
    .await
}

pub async fn list_transactions(
    pool: &PgPool,
    user_id: Uuid,
    type_filter: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Transaction>> {
    sqlx::query_as::<_, Transaction>(
        r#"
        SELECT * FROM transactions
        WHERE user_id = $1
        AND ($2::text IS NULL OR type = $2)
        ORDER BY created_at DESC, id DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(user_id)
    .bind(type_filter)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// Sum of completed payments since `since`, used for the daily-limit check.
/// Runs inside the payment transaction, after the wallet row is locked, so
/// concurrent payments for the same user serialize on the lock.
pub async fn sum_completed_payments_since(
    executor: &mut SqlxTransaction<'_, Postgres>,
    user_id: Uuid,
    since: DateTime<Utc>,
) -> Result<BigDecimal> {
    sqlx::query_scalar::<_, BigDecimal>(
        r#"
        SELECT COALESCE(SUM(amount), 0)
        FROM transactions
        WHERE user_id = $1
        AND type = 'payment'
        AND status = 'completed'
        AND created_at >= $2
        "#,
    )
    .bind(user_id)
    .bind(since)
    .fetch_one(&mut **executor)
    .await
}

// --- Recharge order queries ---

pub async fn insert_recharge_order(pool: &PgPool, order: &RechargeOrder) -> Result<RechargeOrder> {
    sqlx::query_as::<_, RechargeOrder>(
        r#"
        INSERT INTO recharge_orders (
            id, user_id, amount, payment_method, order_reference, status,
            settle_after, attempts, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(&order.amount)
    .bind(&order.payment_method)
    .bind(&order.order_reference)
    .bind(&order.status)
    .bind(order.settle_after)
    .bind(order.attempts)
    .bind(order.created_at)
    .bind(order.updated_at)
    .fetch_one(pool)
    .await
}

/// Claim due pending orders. SKIP LOCKED ensures several worker instances
/// never settle the same order twice.
pub async fn due_orders_for_update(
    executor: &mut SqlxTransaction<'_, Postgres>,
    batch_size: i64,
) -> Result<Vec<RechargeOrder>> {
    sqlx::query_as::<_, RechargeOrder>(
        r#"
        SELECT * FROM recharge_orders
        WHERE status = 'pending'
        AND settle_after <= now()
        ORDER BY settle_after ASC
        LIMIT $1
        FOR UPDATE SKIP LOCKED
        "#,
    )
    .bind(batch_size)
    .fetch_all(&mut **executor)
    .await
}

pub async fn get_pending_order_for_update(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<RechargeOrder>> {
    sqlx::query_as::<_, RechargeOrder>(
        "SELECT * FROM recharge_orders WHERE id = $1 AND status = 'pending' FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut **executor)
    .await
}

pub async fn get_order_by_reference(
    pool: &PgPool,
    order_reference: &str,
) -> Result<Option<RechargeOrder>> {
    sqlx::query_as::<_, RechargeOrder>("SELECT * FROM recharge_orders WHERE order_reference = $1")
        .bind(order_reference)
        .fetch_optional(pool)
        .await
}

pub async fn mark_order_completed(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE recharge_orders
        SET status = 'completed', attempts = attempts + 1, last_error = NULL, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(&mut **executor)
    .await?;

    Ok(())
}

pub async fn mark_order_failed(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
    reason: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE recharge_orders
        SET status = 'failed', attempts = attempts + 1, last_error = $2, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(reason)
    .execute(&mut **executor)
    .await?;

    Ok(())
}

// --- Profile queries ---

pub async fn get_profile_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Profile>> {
    sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Upsert that only overwrites fields the caller actually provided.
#[allow(clippy::too_many_arguments)]
pub async fn upsert_profile(
    pool: &PgPool,
    user_id: Uuid,
    full_name: Option<&str>,
    phone: Option<&str>,
    branch: Option<&str>,
    year_of_study: Option<i32>,
    student_id: Option<&str>,
) -> Result<Profile> {
    sqlx::query_as::<_, Profile>(
        r#"
        INSERT INTO profiles (id, user_id, full_name, phone, branch, year_of_study, student_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (user_id) DO UPDATE SET
            full_name = COALESCE(EXCLUDED.full_name, profiles.full_name),
            phone = COALESCE(EXCLUDED.phone, profiles.phone),
            branch = COALESCE(EXCLUDED.branch, profiles.branch),
            year_of_study = COALESCE(EXCLUDED.year_of_study, profiles.year_of_study),
            student_id = COALESCE(EXCLUDED.student_id, profiles.student_id),
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(full_name)
    .bind(phone)
    .bind(branch)
    .bind(year_of_study)
    .bind(student_id)
    .fetch_one(pool)
    .await
}

// --- Idempotency queries ---

/// First writer wins; a duplicate key leaves the existing row untouched and
/// returns None.
pub async fn claim_idempotency_key(
    pool: &PgPool,
    user_id: Uuid,
    idempotency_key: &str,
    request_hash: &str,
) -> Result<Option<Uuid>> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO idempotency_keys (id, user_id, idempotency_key, request_hash)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, idempotency_key) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(idempotency_key)
    .bind(request_hash)
    .fetch_optional(pool)
    .await
}

pub async fn get_idempotency_record(
    pool: &PgPool,
    user_id: Uuid,
    idempotency_key: &str,
) -> Result<Option<IdempotencyRecord>> {
    sqlx::query_as::<_, IdempotencyRecord>(
        "SELECT * FROM idempotency_keys WHERE user_id = $1 AND idempotency_key = $2",
    )
    .bind(user_id)
    .bind(idempotency_key)
    .fetch_optional(pool)
    .await
}

pub async fn store_idempotency_response(
    pool: &PgPool,
    user_id: Uuid,
    idempotency_key: &str,
    response_status: i32,
    response_body: &serde_json::Value,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE idempotency_keys
        SET response_status = $3, response_body = $4
        WHERE user_id = $1 AND idempotency_key = $2
        "#,
    )
    .bind(user_id)
    .bind(idempotency_key)
    .bind(response_status)
    .bind(response_body)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn release_idempotency_key(
    pool: &PgPool,
    user_id: Uuid,
    idempotency_key: &str,
) -> Result<()> {
    sqlx::query("DELETE FROM idempotency_keys WHERE user_id = $1 AND idempotency_key = $2")
        .bind(user_id)
        .bind(idempotency_key)
        .execute(pool)
        .await?;

    Ok(())
}
