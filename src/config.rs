use std::env;
use std::net::SocketAddr;

use crate::error::AppError;
use crate::notify::WebhookConfig;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub webhook: Option<WebhookConfig>,
    /// Seconds between link repair runs. Zero turns the job off.
    pub reconcile_interval_secs: u64,
}

impl AppConfig {
    /// Reads settings from the environment. Call `dotenvy::dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://purifier.db?mode=rwc".to_string());
        let max_connections = parse_var("DATABASE_MAX_CONNECTIONS", 5)?;
        let bind_addr = parse_var("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::InvalidInput("JWT_SECRET is not set".to_string()))?;
        let token_ttl_hours = parse_var("TOKEN_TTL_HOURS", 24)?;
        let webhook = env::var("NOTIFY_WEBHOOK_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|url| WebhookConfig { url });
        let reconcile_interval_secs = parse_var("RECONCILE_INTERVAL_SECS", 3600)?;

        Ok(Self {
            database_url,
            max_connections,
            bind_addr,
            jwt_secret,
            token_ttl_hours,
            webhook,
            reconcile_interval_secs,
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(default),
    }
}
