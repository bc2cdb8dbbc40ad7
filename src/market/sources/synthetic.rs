//! Synthetic snapshot generator
//!
//! Builds a fixed-shape snapshot around the pair's reference mid. The shape
//! is a template quoted against a 1500 mid and scaled to the pair, so the
//! ETH/USDC pair reproduces the template exactly.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::SyntheticConfig;
use crate::error::{EngineError, Result};
use crate::market::SnapshotSource;
use crate::registry::TokenRegistry;
use crate::types::{
    DepthLevel, MarketDepth, MarketSnapshot, Network, PricePoint, TradePrint, TradingPair,
};

const HOUR_MS: i64 = 3_600_000;
const MINUTE_MS: i64 = 60_000;

fn template_mid() -> Decimal {
    dec!(1500)
}

/// (age in ms, price), oldest first
fn template_history() -> [(i64, Decimal); 3] {
    [
        (3 * HOUR_MS, dec!(1500)),
        (2 * HOUR_MS, dec!(1480)),
        (HOUR_MS, dec!(1450)),
    ]
}

/// (price, amount)
fn template_bids() -> [(Decimal, Decimal); 2] {
    [(dec!(1490), dec!(10)), (dec!(1485), dec!(20))]
}

fn template_asks() -> [(Decimal, Decimal); 2] {
    [(dec!(1510), dec!(15)), (dec!(1515), dec!(25))]
}

/// (price, amount, age in ms), most recent first
fn template_trades() -> [(Decimal, Decimal, i64); 2] {
    [
        (dec!(1500), dec!(1.5), MINUTE_MS),
        (dec!(1498), dec!(0.5), 2 * MINUTE_MS),
    ]
}

pub struct SyntheticSource {
    registry: &'static TokenRegistry,
    volatility_24h: Decimal,
    price_precision: u32,
    /// Keyed by upper-cased symbol
    reference_prices: HashMap<String, Decimal>,
}

impl SyntheticSource {
    pub fn new(config: &SyntheticConfig) -> Self {
        let reference_prices = config
            .reference_prices
            .iter()
            .filter(|(symbol, price)| {
                let usable = **price > Decimal::ZERO;
                if !usable {
                    warn!("Ignoring non-positive reference price for {}: {}", symbol, price);
                }
                usable
            })
            .map(|(symbol, price)| (symbol.to_uppercase(), *price))
            .collect();

        Self {
            registry: TokenRegistry::global(),
            volatility_24h: config.volatility_24h,
            price_precision: config.price_precision,
            reference_prices,
        }
    }

    fn reference_price(&self, symbol: &str) -> Decimal {
        match self.reference_prices.get(&symbol.to_uppercase()) {
            Some(price) => *price,
            None => {
                warn!("No reference price for {}, assuming 1", symbol);
                Decimal::ONE
            }
        }
    }

    /// Pair mid price: reference(base) / reference(quote)
    pub fn mid_price(&self, pair: &TradingPair) -> Result<Decimal> {
        let base = self.reference_price(&pair.base);
        let quote = self.reference_price(&pair.quote);
        base.checked_div(quote).ok_or_else(|| {
            EngineError::MalformedSnapshot(format!("cannot price {} from references", pair))
        })
    }

    /// Snapshot as of `now_ms`. Pure: same inputs, same snapshot.
    pub fn snapshot_at(
        &self,
        pair: &TradingPair,
        network: Network,
        now_ms: i64,
    ) -> Result<MarketSnapshot> {
        self.registry.resolve_pair(pair, network)?;

        let factor = self.mid_price(pair)? / template_mid();
        let scale = |price: Decimal| (price * factor).round_dp(self.price_precision);

        let price_history = template_history()
            .into_iter()
            .map(|(age, price)| PricePoint {
                timestamp: now_ms - age,
                price: scale(price),
            })
            .collect();

        let level = |(price, amount): (Decimal, Decimal)| DepthLevel {
            price: scale(price),
            amount,
        };
        let market_depth = MarketDepth {
            bids: template_bids().into_iter().map(level).collect(),
            asks: template_asks().into_iter().map(level).collect(),
        };

        let last_trades = template_trades()
            .into_iter()
            .map(|(price, amount, age)| TradePrint {
                price: scale(price),
                amount,
                timestamp: now_ms - age,
            })
            .collect();

        let snapshot = MarketSnapshot {
            price_history,
            market_depth,
            volatility_24h: self.volatility_24h,
            last_trades,
        };

        snapshot.validate()?;
        debug!(pair = %pair, network = %network, factor = %factor, "synthetic snapshot built");
        Ok(snapshot)
    }
}

#[async_trait]
impl SnapshotSource for SyntheticSource {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn snapshot(&self, pair: &TradingPair, network: Network) -> Result<MarketSnapshot> {
        let now_ms = chrono::Utc::now().timestamp_millis();
        self.snapshot_at(pair, network, now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_reference_prices;

    const NOW: i64 = 1_700_000_000_000;

    fn source() -> SyntheticSource {
        SyntheticSource::new(&SyntheticConfig {
            volatility_24h: dec!(2.5),
            price_precision: 8,
            reference_prices: default_reference_prices(),
        })
    }

    #[test]
    fn test_eth_usdc_matches_template() {
        let snap = source()
            .snapshot_at(&TradingPair::new("ETH", "USDC"), Network::Testnet, NOW)
            .unwrap();

        let history: Vec<(i64, Decimal)> = snap
            .price_history
            .iter()
            .map(|p| (p.timestamp, p.price))
            .collect();
        assert_eq!(
            history,
            vec![
                (NOW - 3 * HOUR_MS, dec!(1500)),
                (NOW - 2 * HOUR_MS, dec!(1480)),
                (NOW - HOUR_MS, dec!(1450)),
            ]
        );

        assert_eq!(snap.market_depth.total_bids(), Some(dec!(30)));
        assert_eq!(snap.market_depth.total_asks(), Some(dec!(40)));
        assert_eq!(snap.market_depth.bids[0].price, dec!(1490));
        assert_eq!(snap.volatility_24h, dec!(2.5));

        assert_eq!(snap.last_trades.len(), 2);
        assert_eq!(snap.last_trades[0].price, dec!(1500));
        assert_eq!(snap.last_trades[0].timestamp, NOW - MINUTE_MS);
        assert!(snap.last_trades[0].timestamp > snap.last_trades[1].timestamp);
        assert!(snap.validate().is_ok());
    }

    #[test]
    fn test_history_is_oldest_first() {
        let snap = source()
            .snapshot_at(&TradingPair::new("DAI", "ETH"), Network::Mainnet, NOW)
            .unwrap();
        assert!(snap
            .price_history
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn test_inverse_pair_is_scaled() {
        let snap = source()
            .snapshot_at(&TradingPair::new("USDC", "ETH"), Network::Mainnet, NOW)
            .unwrap();
        // template 1500 scaled onto a 1/1500 mid
        let expected = (Decimal::ONE / dec!(1500)).round_dp(8);
        assert_eq!(snap.last_trades[0].price, expected);
        // amounts are not rescaled
        assert_eq!(snap.last_trades[0].amount, dec!(1.5));
    }

    #[test]
    fn test_unknown_symbol_fails() {
        let err = source()
            .snapshot_at(&TradingPair::new("ETH", "DOGE"), Network::Mainnet, NOW)
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::UnknownToken {
                symbol: "DOGE".to_string(),
                network: Network::Mainnet,
            }
        );
    }

    #[test]
    fn test_same_inputs_same_snapshot() {
        let pair = TradingPair::new("EURC", "USDC");
        let a = source().snapshot_at(&pair, Network::Testnet, NOW).unwrap();
        let b = source().snapshot_at(&pair, Network::Testnet, NOW).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_reference_prices_ignore_symbol_case() {
        let mut prices = default_reference_prices();
        prices.remove("xDAI");
        prices.insert("xdai".to_string(), dec!(2));
        let source = SyntheticSource::new(&SyntheticConfig {
            volatility_24h: dec!(1),
            price_precision: 8,
            reference_prices: prices,
        });
        let mid = source.mid_price(&TradingPair::new("xDAI", "USDC")).unwrap();
        assert_eq!(mid, dec!(2));
    }

    #[test]
    fn test_negative_volatility_never_leaves_the_source() {
        let source = SyntheticSource::new(&SyntheticConfig {
            volatility_24h: dec!(-1),
            price_precision: 8,
            reference_prices: default_reference_prices(),
        });
        let err = source
            .snapshot_at(&TradingPair::new("ETH", "USDC"), Network::Testnet, NOW)
            .unwrap_err();
        assert_eq!(err.kind(), "malformed_snapshot");
    }

    #[tokio::test]
    async fn test_trait_snapshot_uses_wall_clock() {
        let before = chrono::Utc::now().timestamp_millis();
        let snap = source()
            .snapshot(&TradingPair::new("ETH", "USDC"), Network::Testnet)
            .await
            .unwrap();
        let after = chrono::Utc::now().timestamp_millis();
        let newest = snap.last_trades[0].timestamp + MINUTE_MS;
        assert!(newest >= before && newest <= after);
    }
}
