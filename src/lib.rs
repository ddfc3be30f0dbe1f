pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod startup;
pub mod utils;
pub mod validation;

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::TokenVerifier;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub verifier: Arc<dyn TokenVerifier>,
    pub config: Config,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::wallet::get_wallet,
        handlers::recharge::recharge,
        handlers::payment::payment,
    ),
    components(schemas(
        handlers::HealthStatus,
        handlers::DbPoolStats,
        handlers::wallet::WalletResponse,
        handlers::recharge::RechargeRequest,
        handlers::recharge::RechargeResponse,
        handlers::payment::PaymentRequest,
        handlers::payment::PaymentResponse,
        db::models::Wallet,
        db::models::Transaction,
    )),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Wallet", description = "Campus wallet ledger operations")
    )
)]
pub struct ApiDoc;

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let protected = Router::new()
        .route(
            "/wallet",
            get(handlers::wallet::get_wallet).post(handlers::wallet::get_wallet),
        )
        .route(
            "/transactions",
            get(handlers::transactions::list_transactions)
                .post(handlers::transactions::list_transactions),
        )
        .route("/recharge", post(handlers::recharge::recharge))
        .route("/payment", post(handlers::payment::payment))
        .route(
            "/profile",
            get(handlers::profile::get_profile).post(handlers::profile::upsert_profile),
        )
        .route("/demo/seed", post(handlers::demo::seed_demo))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(protected)
        .layer(axum::middleware::from_fn(
            middleware::request_logger::request_logger_middleware,
        ))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-idempotency-key"),
        ]);

    match &config.cors_allowed_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            layer.allow_origin(origins)
        }
        None => layer.allow_origin(Any),
    }
}
