//! Fee API routes
//!
//! REST endpoints for the swap frontend.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use super::ApiResponse;
use crate::engine::{FeeEngine, MarketDataRequest, PredictFeeRequest};
use crate::error::EngineError;

/// Create the API router with all endpoints
pub fn create_router(engine: Arc<FeeEngine>) -> Router {
    Router::new()
        .route("/api/market-data", get(get_market_data))
        .route("/api/predict-fee", post(post_predict_fee))
        .route("/api/health", get(get_health))
        .with_state(engine)
        // CORS for frontend
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

fn status_for(err: &EngineError) -> StatusCode {
    if err.is_client_error() {
        return StatusCode::BAD_REQUEST;
    }
    match err {
        EngineError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn respond<T: Serialize>(result: Result<T, EngineError>) -> (StatusCode, Json<ApiResponse<T>>) {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::success(data))),
        Err(err) => {
            let status = status_for(&err);
            if status.is_server_error() {
                warn!("Request failed: {}", err);
            }
            (status, Json(ApiResponse::error(err.kind(), err.to_string())))
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────

/// GET /api/market-data?fromToken=ETH&toToken=USDC&network=testnet
async fn get_market_data(
    State(engine): State<Arc<FeeEngine>>,
    query: Result<Query<MarketDataRequest>, QueryRejection>,
) -> impl IntoResponse {
    match query {
        Ok(Query(request)) => respond(engine.market_data(request).await),
        Err(rejection) => respond(Err(EngineError::InvalidRequest(rejection.body_text()))),
    }
}

/// POST /api/predict-fee
async fn post_predict_fee(
    State(engine): State<Arc<FeeEngine>>,
    body: Result<Json<PredictFeeRequest>, JsonRejection>,
) -> impl IntoResponse {
    match body {
        Ok(Json(request)) => respond(engine.predict_fee(request).await),
        Err(rejection) => respond(Err(EngineError::InvalidRequest(rejection.body_text()))),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    source: &'static str,
    default_network: String,
}

/// GET /api/health
async fn get_health(State(engine): State<Arc<FeeEngine>>) -> impl IntoResponse {
    Json(ApiResponse::success(HealthResponse {
        status: "ok",
        source: engine.source_name(),
        default_network: engine.default_network().to_string(),
    }))
}
