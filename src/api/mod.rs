//! HTTP API Module
//!
//! Exposes the fee engine over HTTP. Only compiled when the `api` feature is
//! enabled.

mod routes;

pub use routes::create_router;

use serde::Serialize;
use std::sync::Arc;

use crate::engine::FeeEngine;

/// Envelope for every API response
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    /// Machine-readable error kind
    pub code: Option<&'static str>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn error(code: &'static str, msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
            code: Some(code),
        }
    }
}

/// Start the API server
pub async fn start_server(engine: Arc<FeeEngine>, bind: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(engine);
    let addr = format!("{}:{}", bind, port);

    tracing::info!("🖥️ Fee API starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
