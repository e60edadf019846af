// Application configuration
//
// Values come from the process environment after `.env` has been loaded by
// `dotenv`. Lookup is injectable so configuration parsing can be tested
// without touching the real environment.

use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 3;
const DEFAULT_TAX_RATE: &str = "0.15";
const DEFAULT_MAX_STAY_NIGHTS: u32 = 365;

/// Configuration errors raised at start-up
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration for the service
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    /// Flat tax rate applied to every offer subtotal
    pub tax_rate: Decimal,
    /// Longest stay accepted by pricing and availability requests
    pub max_stay_nights: u32,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = required(&lookup, "DATABASE_URL")?;
        let jwt_secret = required(&lookup, "JWT_SECRET")?;
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parsed(&lookup, "PORT", DEFAULT_PORT)?;
        let db_max_connections = parsed(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        let acquire_secs = parsed(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", DEFAULT_ACQUIRE_TIMEOUT_SECS)?;

        let tax_raw = lookup("PRICING_TAX_RATE").unwrap_or_else(|| DEFAULT_TAX_RATE.to_string());
        let tax_rate = Decimal::from_str(tax_raw.trim()).map_err(|e| ConfigError::Invalid {
            name: "PRICING_TAX_RATE",
            value: tax_raw.clone(),
            reason: e.to_string(),
        })?;
        if tax_rate.is_sign_negative() {
            return Err(ConfigError::Invalid {
                name: "PRICING_TAX_RATE",
                value: tax_raw,
                reason: "must not be negative".to_string(),
            });
        }

        let max_stay_nights = parsed(&lookup, "MAX_STAY_NIGHTS", DEFAULT_MAX_STAY_NIGHTS)?;
        if max_stay_nights == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_STAY_NIGHTS",
                value: max_stay_nights.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            db_max_connections,
            db_acquire_timeout: Duration::from_secs(acquire_secs),
            tax_rate,
            max_stay_nights,
        })
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parsed<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
