//! FeeCast Library
//!
//! Dynamic swap fee prediction: market snapshots in, fee recommendations out.

pub mod config;
pub mod engine;
pub mod error;
pub mod fees;
pub mod logging;
pub mod market;
pub mod registry;
pub mod types;

#[cfg(feature = "api")]
pub mod api;

pub use engine::{FeeEngine, PredictFeeRequest, PredictFeeResponse};
pub use error::EngineError;
