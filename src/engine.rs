//! Fee engine
//!
//! Request/response facade over a snapshot source and the fee predictor.
//! The engine holds no mutable state, so one instance can serve any number
//! of concurrent requests.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::config::{AppConfig, SourceKind};
use crate::error::{EngineError, Result};
use crate::fees::{parse_amount, FeePredictor};
use crate::market::{HttpSnapshotSource, SnapshotSource, SyntheticSource};
use crate::registry::{TokenInfo, TokenRegistry};
use crate::types::{FeePrediction, MarketSnapshot, Network, TradingPair};

/// Snapshot request: the pair to describe and an optional network
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDataRequest {
    #[serde(default)]
    pub from_token: String,
    #[serde(default)]
    pub to_token: String,
    #[serde(default)]
    pub network: Option<Network>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDataResponse {
    /// Describes `fromToken`
    pub token_data: TokenInfo,
    pub market_data: MarketSnapshot,
}

/// Prediction request. `amount` is a decimal string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictFeeRequest {
    #[serde(default)]
    pub from_token: String,
    #[serde(default)]
    pub to_token: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub network: Option<Network>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictFeeResponse {
    pub prediction: FeePrediction,
    pub market_data: MarketSnapshot,
}

pub struct FeeEngine {
    source: Arc<dyn SnapshotSource>,
    predictor: FeePredictor,
    registry: &'static TokenRegistry,
    default_network: Network,
}

impl FeeEngine {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        predictor: FeePredictor,
        default_network: Network,
    ) -> Self {
        info!(
            "Fee engine ready: source={} default_network={}",
            source.name(),
            default_network
        );
        Self {
            source,
            predictor,
            registry: TokenRegistry::global(),
            default_network,
        }
    }

    /// Build the engine and its snapshot source from configuration
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let source: Arc<dyn SnapshotSource> = match config.engine.source {
            SourceKind::Synthetic => Arc::new(SyntheticSource::new(&config.synthetic)),
            SourceKind::Http => {
                let base_url = config
                    .upstream
                    .base_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("upstream.base_url is not set"))?;
                Arc::new(HttpSnapshotSource::new(base_url, config.upstream.timeout())?)
            }
        };

        Ok(Self::new(
            source,
            FeePredictor::new(config.policy.clone()),
            config.engine.default_network,
        ))
    }

    pub fn default_network(&self) -> Network {
        self.default_network
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Token metadata for `fromToken` plus a snapshot of the pair
    pub async fn market_data(&self, request: MarketDataRequest) -> Result<MarketDataResponse> {
        let pair = required_pair(&request.from_token, &request.to_token)?;
        let network = request.network.unwrap_or(self.default_network);
        let span = request_span(&pair, network);

        async {
            let token_data = self.registry.token_data(&pair.base, network)?.clone();
            let market_data = self.source.snapshot(&pair, network).await?;
            debug!(points = market_data.price_history.len(), "market data served");
            Ok::<_, EngineError>(MarketDataResponse {
                token_data,
                market_data,
            })
        }
        .instrument(span)
        .await
    }

    /// Fetch a snapshot and run the predictor on it
    pub async fn predict_fee(&self, request: PredictFeeRequest) -> Result<PredictFeeResponse> {
        let pair = required_pair(&request.from_token, &request.to_token)?;
        if request.amount.trim().is_empty() {
            return Err(EngineError::MissingParameter("amount"));
        }
        // Reject a bad amount before paying for a snapshot
        let amount = parse_amount(&request.amount)?;
        let network = request.network.unwrap_or(self.default_network);
        let span = request_span(&pair, network);

        async {
            let market_data = self.source.snapshot(&pair, network).await?;
            let prediction = self.predictor.predict(&market_data, amount)?;
            info!(
                amount = %amount,
                fee = %prediction.suggested_fee,
                confidence = %prediction.confidence,
                risk = %prediction.risk_score,
                "💡 Fee predicted"
            );
            Ok::<_, EngineError>(PredictFeeResponse {
                prediction,
                market_data,
            })
        }
        .instrument(span)
        .await
    }
}

fn required_pair(from_token: &str, to_token: &str) -> Result<TradingPair> {
    let from_token = from_token.trim();
    let to_token = to_token.trim();
    if from_token.is_empty() {
        return Err(EngineError::MissingParameter("fromToken"));
    }
    if to_token.is_empty() {
        return Err(EngineError::MissingParameter("toToken"));
    }
    Ok(TradingPair::new(from_token, to_token))
}

fn request_span(pair: &TradingPair, network: Network) -> tracing::Span {
    info_span!(
        "fee_request",
        request_id = %Uuid::new_v4(),
        base = %pair.base,
        quote = %pair.quote,
        network = %network
    )
}
