//! Configuration management for FeeCast
//!
//! Loads from YAML files + environment variables via .env

mod types;

pub use types::*;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::types::Network;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub synthetic: SyntheticConfig,
    pub upstream: UpstreamConfig,
    pub policy: FeePolicy,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Network used when a request does not name one
    pub default_network: Network,
    /// Which snapshot source backs the engine
    pub source: SourceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Synthetic,
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyntheticConfig {
    /// Reported 24h volatility, in percent
    pub volatility_24h: Decimal,
    /// Decimal places kept on generated prices
    pub price_precision: u32,
    /// USD reference price per symbol; pair mid is base / quote
    #[serde(default = "default_reference_prices")]
    pub reference_prices: HashMap<String, Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the market-data service
    pub base_url: Option<String>,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

pub fn default_reference_prices() -> HashMap<String, Decimal> {
    HashMap::from([
        ("ETH".to_string(), dec!(1500)),
        ("USDC".to_string(), dec!(1)),
        ("DAI".to_string(), dec!(1)),
        ("EURC".to_string(), dec!(1.08)),
        ("xDAI".to_string(), dec!(1)),
    ])
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Self::builder_with_defaults()?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (FEECAST_*)
            .add_source(Environment::with_prefix("FEECAST").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config.validate()?;
        Ok(app_config)
    }

    /// Built-in defaults only, no files or environment
    pub fn defaults() -> Result<Self> {
        let config = Self::builder_with_defaults()?
            .build()
            .context("Failed to build configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    fn builder_with_defaults() -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>> {
        let policy = FeePolicy::default();
        let builder = Config::builder()
            // Engine defaults
            .set_default("engine.default_network", "testnet")?
            .set_default("engine.source", "synthetic")?
            // Synthetic source defaults
            .set_default("synthetic.volatility_24h", "2.5")?
            .set_default("synthetic.price_precision", 8)?
            // Upstream defaults
            .set_default("upstream.timeout_ms", 5000)?
            // Policy defaults
            .set_default("policy.base_fee_pct", policy.base_fee_pct.to_string())?
            .set_default(
                "policy.high_volatility_threshold",
                policy.high_volatility_threshold.to_string(),
            )?
            .set_default(
                "policy.volatility_surcharge_pct",
                policy.volatility_surcharge_pct.to_string(),
            )?
            .set_default(
                "policy.large_trade_threshold",
                policy.large_trade_threshold.to_string(),
            )?
            .set_default(
                "policy.large_trade_discount_pct",
                policy.large_trade_discount_pct.to_string(),
            )?
            .set_default(
                "policy.small_trade_threshold",
                policy.small_trade_threshold.to_string(),
            )?
            .set_default(
                "policy.small_trade_surcharge_pct",
                policy.small_trade_surcharge_pct.to_string(),
            )?
            .set_default(
                "policy.depth_coverage_multiple",
                policy.depth_coverage_multiple.to_string(),
            )?
            // API defaults
            .set_default("api.bind", "0.0.0.0")?
            .set_default("api.port", 3001)?
            // Logging defaults
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?;
        Ok(builder)
    }

    /// Reject combinations the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.engine.source == SourceKind::Http {
            match self.upstream.base_url.as_deref() {
                Some(url) if !url.trim().is_empty() => {}
                _ => bail!("engine.source = \"http\" requires upstream.base_url"),
            }
        }

        if self.policy.depth_coverage_multiple <= Decimal::ZERO {
            bail!(
                "policy.depth_coverage_multiple must be positive, got {}",
                self.policy.depth_coverage_multiple
            );
        }

        if self.synthetic.volatility_24h < Decimal::ZERO {
            bail!(
                "synthetic.volatility_24h must not be negative, got {}",
                self.synthetic.volatility_24h
            );
        }

        if self.synthetic.price_precision > 28 {
            bail!(
                "synthetic.price_precision must be at most 28, got {}",
                self.synthetic.price_precision
            );
        }

        if let Some((symbol, price)) = self
            .synthetic
            .reference_prices
            .iter()
            .find(|(_, price)| **price <= Decimal::ZERO)
        {
            bail!("reference price for {} must be positive, got {}", symbol, price);
        }

        Ok(())
    }

    /// Generate a digest of the config for logging
    pub fn digest(&self) -> String {
        format!(
            "network={} source={:?} base_fee={} api={}:{}",
            self.engine.default_network,
            self.engine.source,
            self.policy.base_fee_pct,
            self.api.bind,
            self.api.port
        )
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_reproduce_builtin_policy() {
        let config = AppConfig::defaults().unwrap();
        assert_eq!(config.policy, FeePolicy::default());
        assert_eq!(config.engine.default_network, Network::Testnet);
        assert_eq!(config.engine.source, SourceKind::Synthetic);
        assert_eq!(config.synthetic.volatility_24h, dec!(2.5));
        assert_eq!(config.synthetic.reference_prices["ETH"], dec!(1500));
        assert_eq!(config.upstream.base_url, None);
        assert_eq!(config.upstream.timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_http_source_requires_base_url() {
        let mut config = AppConfig::defaults().unwrap();
        config.engine.source = SourceKind::Http;
        assert!(config.validate().is_err());

        config.upstream.base_url = Some("http://localhost:3000/api/optimism".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_non_positive_depth_multiple_is_rejected() {
        let mut config = AppConfig::defaults().unwrap();
        config.policy.depth_coverage_multiple = Decimal::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_synthetic_volatility_is_rejected() {
        let mut config = AppConfig::defaults().unwrap();
        config.synthetic.volatility_24h = dec!(-1);
        assert!(config.validate().is_err());

        config.synthetic.volatility_24h = Decimal::ZERO;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_digest_names_network_and_fee() {
        let config = AppConfig::defaults().unwrap();
        let digest = config.to_string();
        assert!(digest.contains("network=testnet"));
        assert!(digest.contains("base_fee=0.3"));
    }
}
