//! Fee predictor
//!
//! Applies `FeePolicy` to a snapshot. Pure and deterministic: the snapshot
//! and the amount fully determine the output.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::str::FromStr;
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::fees::FeePolicy;
use crate::types::{FeePrediction, MarketSnapshot};

const FEE_DP: u32 = 3;
const RISK_DP: u32 = 2;

#[derive(Debug, Clone, Default)]
pub struct FeePredictor {
    policy: FeePolicy,
}

impl FeePredictor {
    pub fn new(policy: FeePolicy) -> Self {
        Self { policy }
    }

    /// Predict from an amount given as a decimal string.
    pub fn predict_str(&self, snapshot: &MarketSnapshot, amount: &str) -> Result<FeePrediction> {
        let amount = parse_amount(amount)?;
        self.predict(snapshot, amount)
    }

    pub fn predict(&self, snapshot: &MarketSnapshot, amount: Decimal) -> Result<FeePrediction> {
        if amount <= Decimal::ZERO {
            return Err(EngineError::InvalidAmount(format!(
                "amount must be positive, got {}",
                amount
            )));
        }
        snapshot.validate_for_pricing()?;

        let predicted_price = snapshot
            .reference_price()
            .ok_or_else(|| EngineError::EmptySnapshot("no recent trades".to_string()))?;
        let volatility = snapshot.volatility_24h;

        let fee = self.policy.fee_pct(volatility, amount);
        let confidence = self.confidence(snapshot, amount)?;

        let risk = volatility
            .checked_mul(dec!(10))
            .and_then(|term| term.checked_add(dec!(100) - confidence))
            .and_then(|sum| sum.checked_div(dec!(2)))
            .ok_or_else(|| {
                EngineError::MalformedSnapshot(format!("volatility {} out of range", volatility))
            })?;

        let prediction = FeePrediction {
            predicted_price,
            confidence,
            suggested_fee: round_fixed(fee, FEE_DP),
            risk_score: round_fixed(risk, RISK_DP),
        };

        debug!(
            amount = %amount,
            volatility = %volatility,
            fee = %prediction.suggested_fee,
            confidence = %prediction.confidence,
            risk = %prediction.risk_score,
            "fee predicted"
        );

        Ok(prediction)
    }

    /// Share of the required depth present in the book, as a percentage in `[0, 100]`.
    fn confidence(&self, snapshot: &MarketSnapshot, amount: Decimal) -> Result<Decimal> {
        let depth = &snapshot.market_depth;
        let available = depth
            .total_bids()
            .zip(depth.total_asks())
            .and_then(|(bids, asks)| bids.checked_add(asks))
            .ok_or_else(|| EngineError::MalformedSnapshot("depth total overflows".to_string()))?;

        let multiple = self.policy.depth_coverage_multiple;
        let coverage = match amount.checked_mul(multiple) {
            Some(required) if available >= required => Decimal::ONE,
            Some(required) => available.checked_div(required).unwrap_or(Decimal::ZERO),
            // Requirement beyond Decimal range: divide in two steps, the result is near zero
            None => available
                .checked_div(amount)
                .and_then(|per_unit| per_unit.checked_div(multiple))
                .unwrap_or(Decimal::ZERO),
        };

        let confidence = coverage.clamp(Decimal::ZERO, Decimal::ONE) * dec!(100);
        Ok(confidence)
    }
}

/// Parse a trade amount sent as a decimal string.
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidAmount("amount is empty".to_string()));
    }
    let amount = Decimal::from_str(trimmed).map_err(|_| {
        EngineError::InvalidAmount(format!("{:?} is not a decimal number", trimmed))
    })?;
    if amount <= Decimal::ZERO {
        return Err(EngineError::InvalidAmount(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(amount)
}

/// Round half away from zero and pin the scale so the string form always
/// carries `dp` fractional digits.
fn round_fixed(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DepthLevel, MarketDepth, PricePoint, TradePrint};

    fn level(amount: Decimal) -> DepthLevel {
        DepthLevel {
            price: dec!(1500),
            amount,
        }
    }

    fn snapshot(volatility: Decimal, bids: Vec<Decimal>, asks: Vec<Decimal>) -> MarketSnapshot {
        MarketSnapshot {
            price_history: vec![PricePoint {
                timestamp: 1_700_000_000_000,
                price: dec!(1500),
            }],
            market_depth: MarketDepth {
                bids: bids.into_iter().map(level).collect(),
                asks: asks.into_iter().map(level).collect(),
            },
            volatility_24h: volatility,
            last_trades: vec![
                TradePrint {
                    price: dec!(1500),
                    amount: dec!(1.5),
                    timestamp: 1_700_000_060_000,
                },
                TradePrint {
                    price: dec!(1498),
                    amount: dec!(0.5),
                    timestamp: 1_700_000_000_000,
                },
            ],
        }
    }

    #[test]
    fn test_prices_from_most_recent_trade() {
        let predictor = FeePredictor::default();
        let snap = snapshot(dec!(2.5), vec![dec!(10)], vec![dec!(15)]);
        let prediction = predictor.predict(&snap, dec!(500)).unwrap();
        assert_eq!(prediction.predicted_price, dec!(1500));
    }

    #[test]
    fn test_confidence_saturates_at_100() {
        let predictor = FeePredictor::default();
        let snap = snapshot(dec!(0), vec![dec!(5000)], vec![dec!(5000)]);
        let prediction = predictor.predict(&snap, dec!(200)).unwrap();
        assert_eq!(prediction.confidence, dec!(100));
        assert_eq!(prediction.risk_score, dec!(0));
        assert_eq!(prediction.risk_score.scale(), 2);
    }

    #[test]
    fn test_outputs_have_fixed_scale() {
        let predictor = FeePredictor::default();
        let snap = snapshot(dec!(3.333), vec![dec!(1)], vec![dec!(2)]);
        let prediction = predictor.predict(&snap, dec!(7)).unwrap();
        assert_eq!(prediction.suggested_fee.scale(), 3);
        assert_eq!(prediction.risk_score.scale(), 2);
        assert_eq!(prediction.suggested_fee.to_string(), "0.400");
    }

    #[test]
    fn test_risk_rounds_half_away_from_zero() {
        // full depth coverage, risk = 0.01 / 2 = 0.005
        let predictor = FeePredictor::default();
        let snap = snapshot(dec!(0.001), vec![dec!(10000)], vec![]);
        let prediction = predictor.predict(&snap, dec!(500)).unwrap();
        assert_eq!(prediction.risk_score.to_string(), "0.01");
    }

    #[test]
    fn test_zero_and_negative_amounts_are_rejected() {
        let predictor = FeePredictor::default();
        let snap = snapshot(dec!(2.5), vec![], vec![]);
        assert!(matches!(
            predictor.predict(&snap, Decimal::ZERO),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            predictor.predict(&snap, dec!(-5)),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_amount_is_checked_before_snapshot() {
        let predictor = FeePredictor::default();
        let mut snap = snapshot(dec!(2.5), vec![], vec![]);
        snap.last_trades.clear();
        assert!(matches!(
            predictor.predict(&snap, Decimal::ZERO),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            predictor.predict(&snap, dec!(1)),
            Err(EngineError::EmptySnapshot(_))
        ));
    }

    #[test]
    fn test_huge_volatility_is_malformed_not_a_panic() {
        let predictor = FeePredictor::default();
        for volatility in [dec!(7922816251426433759354395033), Decimal::MAX] {
            let snap = snapshot(volatility, vec![], vec![]);
            assert!(matches!(
                predictor.predict(&snap, dec!(500)),
                Err(EngineError::MalformedSnapshot(_))
            ));
        }
    }

    #[test]
    fn test_tiny_amount_has_full_confidence() {
        let predictor = FeePredictor::default();
        let snap = snapshot(dec!(2.5), vec![dec!(600)], vec![dec!(400)]);
        let prediction = predictor
            .predict(&snap, dec!(0.0000000000000000000000000001))
            .unwrap();
        assert_eq!(prediction.confidence, dec!(100));
        assert_eq!(prediction.suggested_fee.to_string(), "0.400");
    }

    #[test]
    fn test_huge_amount_has_near_zero_confidence() {
        let predictor = FeePredictor::default();
        let snap = snapshot(dec!(2.5), vec![dec!(600)], vec![dec!(400)]);
        let prediction = predictor
            .predict(&snap, dec!(10000000000000000000000000000))
            .unwrap();
        assert!(prediction.confidence >= Decimal::ZERO);
        assert!(prediction.confidence < dec!(0.0001));
        assert_eq!(prediction.suggested_fee.to_string(), "0.200");
        assert_eq!(prediction.risk_score.to_string(), "62.50");
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount(" 12.50 ").unwrap(), dec!(12.5));
        for raw in ["", "   ", "abc", "1.2.3", "0", "-1", "NaN"] {
            assert!(
                matches!(parse_amount(raw), Err(EngineError::InvalidAmount(_))),
                "expected InvalidAmount for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_predict_str_matches_predict() {
        let predictor = FeePredictor::default();
        let snap = snapshot(dec!(6.0), vec![dec!(30)], vec![dec!(40)]);
        assert_eq!(
            predictor.predict_str(&snap, "50").unwrap(),
            predictor.predict(&snap, dec!(50)).unwrap()
        );
    }

    #[test]
    fn test_custom_policy_is_applied() {
        let predictor = FeePredictor::new(FeePolicy {
            base_fee_pct: dec!(0.25),
            ..FeePolicy::default()
        });
        let snap = snapshot(dec!(1), vec![], vec![]);
        let prediction = predictor.predict(&snap, dec!(500)).unwrap();
        assert_eq!(prediction.suggested_fee.to_string(), "0.250");
    }
}
