//! HTTP snapshot source
//!
//! Fetches `GET {base}/market-data?fromToken=..&toToken=..&network=..` from a
//! market-data service and expects `{ "marketData": <snapshot> }` back.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::market::SnapshotSource;
use crate::registry::TokenRegistry;
use crate::types::{MarketSnapshot, Network, TradingPair};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketDataEnvelope {
    market_data: MarketSnapshot,
}

pub struct HttpSnapshotSource {
    client: Client,
    base_url: String,
    registry: &'static TokenRegistry,
}

impl HttpSnapshotSource {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            registry: TokenRegistry::global(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/market-data", self.base_url)
    }

    /// Decode and check an upstream body.
    fn parse_body(body: &str) -> Result<MarketSnapshot> {
        let envelope: MarketDataEnvelope = serde_json::from_str(body).map_err(|e| {
            EngineError::UpstreamUnavailable(format!("undecodable market data: {}", e))
        })?;
        let snapshot = envelope.market_data;
        snapshot.validate().map_err(|e| {
            EngineError::UpstreamUnavailable(format!("upstream broke snapshot contract: {}", e))
        })?;
        Ok(snapshot)
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn snapshot(&self, pair: &TradingPair, network: Network) -> Result<MarketSnapshot> {
        self.registry.resolve_pair(pair, network)?;

        let network_param = network.to_string();
        let response = self
            .client
            .get(self.endpoint())
            .query(&[
                ("fromToken", pair.base.as_str()),
                ("toToken", pair.quote.as_str()),
                ("network", network_param.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!("Market data request for {} failed: {}", pair, e);
                EngineError::UpstreamUnavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Market data for {} returned {}", pair, status);
            return Err(EngineError::UpstreamUnavailable(format!(
                "market data returned {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| EngineError::UpstreamUnavailable(e.to_string()))?;

        let snapshot = Self::parse_body(&body)?;
        debug!(pair = %pair, network = %network, "upstream snapshot received");
        Ok(snapshot)
    }
}
