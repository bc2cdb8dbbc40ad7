use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Constants of the fee rule set. All fees are percentages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePolicy {
    pub base_fee_pct: Decimal,
    /// Volatility strictly above this adds `volatility_surcharge_pct`
    pub high_volatility_threshold: Decimal,
    pub volatility_surcharge_pct: Decimal,
    /// Amounts strictly above this get `large_trade_discount_pct` off
    pub large_trade_threshold: Decimal,
    pub large_trade_discount_pct: Decimal,
    /// Amounts strictly below this pay `small_trade_surcharge_pct` extra
    pub small_trade_threshold: Decimal,
    pub small_trade_surcharge_pct: Decimal,
    /// Full confidence needs book depth of `amount * depth_coverage_multiple`
    pub depth_coverage_multiple: Decimal,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            base_fee_pct: dec!(0.3),
            high_volatility_threshold: dec!(5),
            volatility_surcharge_pct: dec!(0.1),
            large_trade_threshold: dec!(10000),
            large_trade_discount_pct: dec!(0.1),
            small_trade_threshold: dec!(100),
            small_trade_surcharge_pct: dec!(0.1),
            depth_coverage_multiple: dec!(10),
        }
    }
}

impl FeePolicy {
    /// Unrounded fee for a trade. Not clamped: extreme policies can go negative.
    pub fn fee_pct(&self, volatility: Decimal, amount: Decimal) -> Decimal {
        let mut fee = self.base_fee_pct;

        if volatility > self.high_volatility_threshold {
            fee += self.volatility_surcharge_pct;
        }

        // Size adjustments are exclusive, large checked first
        if amount > self.large_trade_threshold {
            fee -= self.large_trade_discount_pct;
        } else if amount < self.small_trade_threshold {
            fee += self.small_trade_surcharge_pct;
        }

        fee
    }
}
