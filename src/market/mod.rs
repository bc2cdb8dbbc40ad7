//! Market module - snapshot providers
//!
//! A `SnapshotSource` turns a trading pair into a `MarketSnapshot`. The
//! predictor only sees the snapshot, so sources can be swapped freely.

pub mod sources;

pub use sources::{HttpSnapshotSource, SyntheticSource};

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{MarketSnapshot, Network, TradingPair};

/// Trait for market snapshot providers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Get the source name
    fn name(&self) -> &'static str;

    /// Fetch a snapshot for `pair` on `network`.
    ///
    /// Unknown symbols fail with `UnknownToken` before any other work. A
    /// returned snapshot always passes `MarketSnapshot::validate`.
    async fn snapshot(&self, pair: &TradingPair, network: Network) -> Result<MarketSnapshot>;
}
