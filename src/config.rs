use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub auth_provider_url: String,
    pub cors_allowed_origins: Option<String>,
    pub settlement_delay_secs: u64,
    pub settlement_poll_secs: u64,
    pub log_request_body: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")?,
            auth_provider_url: env::var("AUTH_PROVIDER_URL")?,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS").ok(),
            settlement_delay_secs: env::var("SETTLEMENT_DELAY_SECS")
                .unwrap_or_else(|_| "2".to_string())
                .parse()?,
            settlement_poll_secs: env::var("SETTLEMENT_POLL_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            log_request_body: env::var("LOG_REQUEST_BODY")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        })
    }
}
