use clap::Parser;
use sqlx::migrate::Migrator;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fingerpays_core::auth::IdentityClient;
use fingerpays_core::cli::{Cli, Commands, DbCommands, DemoCommands, OrderCommands};
use fingerpays_core::config::Config;
use fingerpays_core::services::SettlementWorker;
use fingerpays_core::{AppState, create_app, db, startup};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Setup logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Db(DbCommands::Migrate) => {
            let pool = db::create_pool(&config).await?;
            let migrator = Migrator::new(Path::new("./migrations")).await?;
            migrator.run(&pool).await?;
            println!("Database migrations completed");
            Ok(())
        }
        Commands::Order(OrderCommands::ForceSettle { order_id }) => {
            let pool = db::create_pool(&config).await?;
            fingerpays_core::cli::handle_order_force_settle(&pool, order_id).await
        }
        Commands::Demo(DemoCommands::Seed { user_id }) => {
            let pool = db::create_pool(&config).await?;
            fingerpays_core::cli::handle_demo_seed(&pool, user_id).await
        }
        Commands::Config => {
            let pool = db::create_pool(&config).await?;
            let report = startup::validate_environment(&config, &pool).await?;
            report.print();
            if !report.is_valid() {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    // Database pool
    let pool = db::create_pool(&config).await?;

    // Run migrations
    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("Database migrations completed");

    // Identity provider client
    let verifier = Arc::new(IdentityClient::new(config.auth_provider_url.clone()));
    tracing::info!(
        "Identity provider client initialized with URL: {}",
        config.auth_provider_url
    );

    // Settlement worker: the durable replacement for fire-and-forget
    // settlement. Pending orders survive restarts and are picked up here.
    let worker = SettlementWorker::new(
        pool.clone(),
        Duration::from_secs(config.settlement_poll_secs),
    );
    tokio::spawn(worker.run());

    let state = AppState {
        db: pool,
        verifier,
        config: config.clone(),
    };
    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
