use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::utils::money::{Currency, MoneyError};

const DEFAULT_GATEWAY_URL: &str = "https://api.stripe.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("STRIPE_SECRET_KEY not configured")]
    MissingSecret,
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("invalid gateway base url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error(transparent)]
    Currency(#[from] MoneyError),
}

/// Gateway API key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(***)")
    }
}

/// Overlay read from the optional TOML file; unset keys fall through to
/// the environment and then to the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub server_port: Option<u16>,
    pub gateway_secret_key: Option<String>,
    pub gateway_base_url: Option<String>,
    pub gateway_timeout_ms: Option<u64>,
    pub currency: Option<String>,
    pub platform_fee_bps: Option<u32>,
    pub description_prefix: Option<String>,
}

impl FileConfig {
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&raw)?)
    }
}

/// Business settings the payment service needs per request.
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub currency: Currency,
    /// Platform commission in basis points (1000 = 10%).
    pub platform_fee_bps: u32,
    pub description_prefix: String,
}

impl PaymentSettings {
    pub fn fee_rate(&self) -> Decimal {
        Decimal::new(i64::from(self.platform_fee_bps), 4)
    }
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            platform_fee_bps: 1000,
            description_prefix: "TIES Together Booking".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub gateway_secret_key: SecretKey,
    pub gateway_base_url: Url,
    pub gateway_timeout: Duration,
    pub payments: PaymentSettings,
}

impl Config {
    /// Reads the optional TOML file, then lets the process environment
    /// override it.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => FileConfig::read(path)?,
            None => FileConfig::default(),
        };
        Self::from_sources(file, |key| env::var(key).ok())
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    pub fn from_sources<F>(file: FileConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = PaymentSettings::default();

        let gateway_secret_key = lookup("STRIPE_SECRET_KEY")
            .or(file.gateway_secret_key)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        let server_port = match lookup("PORT") {
            Some(value) => parse_value("PORT", value)?,
            None => file.server_port.unwrap_or(9999),
        };

        let mut gateway_base_url = Url::parse(
            &lookup("STRIPE_API_BASE")
                .or(file.gateway_base_url)
                .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string()),
        )?;
        // Url::join replaces the last segment unless the path ends with '/'
        if !gateway_base_url.path().ends_with('/') {
            let path = format!("{}/", gateway_base_url.path());
            gateway_base_url.set_path(&path);
        }

        let gateway_timeout_ms = match lookup("GATEWAY_TIMEOUT_MS") {
            Some(value) => parse_value("GATEWAY_TIMEOUT_MS", value)?,
            None => file.gateway_timeout_ms.unwrap_or(5000),
        };

        let currency = match lookup("PAYMENT_CURRENCY").or(file.currency) {
            Some(code) => Currency::parse(&code)?,
            None => defaults.currency,
        };

        let platform_fee_bps: u32 = match lookup("PLATFORM_FEE_BPS") {
            Some(value) => parse_value("PLATFORM_FEE_BPS", value)?,
            None => file.platform_fee_bps.unwrap_or(defaults.platform_fee_bps),
        };
        if platform_fee_bps > 10_000 {
            return Err(ConfigError::InvalidValue {
                key: "PLATFORM_FEE_BPS",
                value: platform_fee_bps.to_string(),
            });
        }

        let description_prefix = lookup("PAYMENT_DESCRIPTION_PREFIX")
            .or(file.description_prefix)
            .unwrap_or(defaults.description_prefix);

        Ok(Self {
            server_port,
            gateway_secret_key: SecretKey::new(gateway_secret_key),
            gateway_base_url,
            gateway_timeout: Duration::from_millis(gateway_timeout_ms),
            payments: PaymentSettings {
                currency,
                platform_fee_bps,
                description_prefix,
            },
        })
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}
