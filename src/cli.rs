use clap::{Parser, Subcommand};
use sqlx::PgPool;
use tokio::time::Duration;
use uuid::Uuid;

use crate::services::{SettleOutcome, SettlementWorker, seed_demo_transactions};

#[derive(Parser)]
#[command(name = "fingerpays-core")]
#[command(about = "Fingerpays Core - Campus Wallet Ledger Service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Recharge order management commands
    #[command(subcommand)]
    Order(OrderCommands),

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommands),

    /// Demo data commands
    #[command(subcommand)]
    Demo(DemoCommands),

    /// Configuration validation
    Config,
}

#[derive(Subcommand)]
pub enum OrderCommands {
    /// Settle a pending recharge order immediately, ignoring its settle time
    ForceSettle {
        /// Recharge order UUID
        #[arg(value_name = "ORDER_ID")]
        order_id: Uuid,
    },
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Run database migrations
    Migrate,
}

#[derive(Subcommand)]
pub enum DemoCommands {
    /// Insert the sample transaction set for a user's wallet
    Seed {
        /// User UUID
        #[arg(value_name = "USER_ID")]
        user_id: Uuid,
    },
}

pub async fn handle_order_force_settle(pool: &PgPool, order_id: Uuid) -> anyhow::Result<()> {
    let worker = SettlementWorker::new(pool.clone(), Duration::from_secs(0));

    match worker.settle_order(order_id).await? {
        SettleOutcome::Credited => println!("Order {} settled and credited", order_id),
        SettleOutcome::Rejected => {
            println!("Order {} could not be credited and was marked failed", order_id)
        }
    }

    Ok(())
}

pub async fn handle_demo_seed(pool: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
    let inserted = seed_demo_transactions(pool, user_id).await?;
    println!(
        "Created {} demo transactions for user {}",
        inserted.len(),
        user_id
    );

    Ok(())
}
