use crate::core::{AppError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    pub rates: RateConfig,
    pub poller: PollerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
}

/// Card-processor connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    pub api_version: String,
    pub partner_id: String,
    /// RSA private key material: PEM (PKCS#8 or PKCS#1) or a bare
    /// base64-encoded DER blob.
    pub private_key: String,
}

/// Exchange-rate feed settings. The default rate is the deterministic
/// fallback used until the first successful fetch.
#[derive(Debug, Clone, Deserialize)]
pub struct RateConfig {
    pub primary_url: String,
    pub backup_url: String,
    pub default_rate: Decimal,
}

/// Poll-driven reconciliation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PollerConfig {
    pub interval_secs: u64,
    /// Only attempts pending at least this long are polled, giving the
    /// webhook path first shot at every reconciliation.
    pub min_pending_age_secs: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            gateway: GatewayConfig {
                base_url: env::var("GATEWAY_BASE_URL")
                    .map_err(|_| AppError::Configuration("GATEWAY_BASE_URL not set".to_string()))?,
                api_version: env::var("GATEWAY_API_VERSION")
                    .unwrap_or_else(|_| "v1.0".to_string()),
                partner_id: env::var("GATEWAY_PARTNER_ID")
                    .map_err(|_| AppError::Configuration("GATEWAY_PARTNER_ID not set".to_string()))?,
                private_key: env::var("GATEWAY_PRIVATE_KEY").map_err(|_| {
                    AppError::Configuration("GATEWAY_PRIVATE_KEY not set".to_string())
                })?,
            },
            rates: RateConfig {
                primary_url: env::var("RATE_PRIMARY_URL")
                    .map_err(|_| AppError::Configuration("RATE_PRIMARY_URL not set".to_string()))?,
                backup_url: env::var("RATE_BACKUP_URL")
                    .map_err(|_| AppError::Configuration("RATE_BACKUP_URL not set".to_string()))?,
                default_rate: env::var("RATE_DEFAULT_USD_IDR")
                    .unwrap_or_else(|_| "15800".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid RATE_DEFAULT_USD_IDR".to_string())
                    })?,
            },
            poller: PollerConfig {
                interval_secs: env::var("RECONCILE_POLL_INTERVAL_SECS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid RECONCILE_POLL_INTERVAL_SECS".to_string())
                    })?,
                min_pending_age_secs: env::var("RECONCILE_MIN_PENDING_AGE_SECS")
                    .unwrap_or_else(|_| "120".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid RECONCILE_MIN_PENDING_AGE_SECS".to_string())
                    })?,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.rates.default_rate <= Decimal::ZERO {
            return Err(AppError::Configuration(
                "Default exchange rate must be positive".to_string(),
            ));
        }

        if self.poller.interval_secs == 0 {
            return Err(AppError::Configuration(
                "Reconciliation poll interval must be greater than 0".to_string(),
            ));
        }

        if self.gateway.private_key.trim().is_empty() {
            return Err(AppError::Configuration(
                "Gateway private key must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
