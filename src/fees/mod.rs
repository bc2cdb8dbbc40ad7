//! Fee prediction: the fixed rule set that turns a market snapshot and a
//! trade amount into a suggested fee, confidence and risk score.

pub mod policy;
pub mod predictor;

pub use policy::FeePolicy;
pub use predictor::{parse_amount, FeePredictor};
