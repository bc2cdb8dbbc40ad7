//! Core types used throughout FeeCast
//!
//! Market snapshot and fee prediction value objects. Every price, amount and
//! percentage is a `Decimal` and travels as a decimal string on the wire.

use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::{EngineError, Result};

/// Supported networks. Names match case-insensitively wherever they are parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Default for Network {
    fn default() -> Self {
        Network::Testnet
    }
}

impl Network {
    pub const ALL: [Network; 2] = [Network::Mainnet, Network::Testnet];

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" => Some(Network::Mainnet),
            "testnet" => Some(Network::Testnet),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Network {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Network::from_str(&raw)
            .ok_or_else(|| de::Error::unknown_variant(&raw, &["mainnet", "testnet"]))
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

/// Ordered pair of registry symbols
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    pub base: String,
    pub quote: String,
}

impl TradingPair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// One point of the price history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Milliseconds since epoch
    pub timestamp: i64,
    pub price: Decimal,
}

/// A resting order level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDepth {
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
}

impl MarketDepth {
    /// Sum of bid amounts, `None` on overflow
    pub fn total_bids(&self) -> Option<Decimal> {
        sum_amounts(&self.bids)
    }

    /// Sum of ask amounts, `None` on overflow
    pub fn total_asks(&self) -> Option<Decimal> {
        sum_amounts(&self.asks)
    }

    fn has_negative_amount(&self) -> bool {
        self.bids
            .iter()
            .chain(self.asks.iter())
            .any(|level| level.amount.is_sign_negative() && !level.amount.is_zero())
    }
}

fn sum_amounts(levels: &[DepthLevel]) -> Option<Decimal> {
    levels
        .iter()
        .try_fold(Decimal::ZERO, |acc, level| acc.checked_add(level.amount))
}

/// An executed trade print
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradePrint {
    pub price: Decimal,
    pub amount: Decimal,
    /// Milliseconds since epoch
    pub timestamp: i64,
}

/// Point-in-time view of market conditions for a pair.
///
/// `price_history` is oldest first, `last_trades` is most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub price_history: Vec<PricePoint>,
    pub market_depth: MarketDepth,
    /// Percentage, e.g. `2.5` means 2.5%
    pub volatility_24h: Decimal,
    pub last_trades: Vec<TradePrint>,
}

impl MarketSnapshot {
    /// Most recent trade price
    pub fn reference_price(&self) -> Option<Decimal> {
        self.last_trades.first().map(|t| t.price)
    }

    /// Check the invariants every snapshot source must uphold.
    pub fn validate(&self) -> Result<()> {
        if self.price_history.is_empty() {
            return Err(EngineError::EmptySnapshot(
                "price history is empty".to_string(),
            ));
        }
        self.validate_for_pricing()
    }

    /// The subset of `validate` the predictor depends on.
    pub(crate) fn validate_for_pricing(&self) -> Result<()> {
        if self.last_trades.is_empty() {
            return Err(EngineError::EmptySnapshot(
                "no recent trades to price from".to_string(),
            ));
        }
        if self.volatility_24h.is_sign_negative() && !self.volatility_24h.is_zero() {
            return Err(EngineError::MalformedSnapshot(format!(
                "negative volatility {}",
                self.volatility_24h
            )));
        }
        if self.market_depth.has_negative_amount() {
            return Err(EngineError::MalformedSnapshot(
                "negative depth amount".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fee recommendation for a single trade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeePrediction {
    pub predicted_price: Decimal,
    /// In `[0, 100]`, full precision
    pub confidence: Decimal,
    /// Percentage, exactly 3 decimal places
    pub suggested_fee: Decimal,
    /// Exactly 2 decimal places
    pub risk_score: Decimal,
}
