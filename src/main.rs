//! FeeCast binary
//!
//! Usage:
//!   feecast quote <FROM> <TO> <AMOUNT> [mainnet|testnet]
//!   feecast serve            (requires the `api` feature)

use anyhow::{bail, Result};
use std::sync::Arc;
use tracing::info;

use feecast::config::AppConfig;
use feecast::engine::{FeeEngine, PredictFeeRequest};
use feecast::registry::TokenRegistry;
use feecast::types::Network;

const USAGE: &str = "usage:\n  feecast quote <FROM> <TO> <AMOUNT> [mainnet|testnet]\n  feecast serve";

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    feecast::logging::init(&config.logging)?;

    info!("🚀 FeeCast {} starting: {}", env!("CARGO_PKG_VERSION"), config);

    let registry = TokenRegistry::global();
    for network in Network::ALL {
        info!(
            "📒 {} tokens: {}",
            network,
            registry.symbols(network).join(", ")
        );
    }

    let engine = Arc::new(FeeEngine::from_config(&config)?);
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("quote") => quote(&engine, &args[1..]).await,
        Some("serve") => serve(engine, &config).await,
        _ => {
            eprintln!("{}", USAGE);
            Ok(())
        }
    }
}

async fn quote(engine: &FeeEngine, args: &[String]) -> Result<()> {
    let (from_token, to_token, amount) = match args {
        [from, to, amount, ..] => (from.clone(), to.clone(), amount.clone()),
        _ => bail!("{}", USAGE),
    };
    let network = match args.get(3) {
        Some(raw) => match Network::from_str(raw) {
            Some(network) => Some(network),
            None => bail!("unknown network {:?}, expected mainnet or testnet", raw),
        },
        None => None,
    };

    let response = engine
        .predict_fee(PredictFeeRequest {
            from_token,
            to_token,
            amount,
            network,
        })
        .await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

#[cfg(feature = "api")]
async fn serve(engine: Arc<FeeEngine>, config: &AppConfig) -> Result<()> {
    feecast::api::start_server(engine, &config.api.bind, config.api.port).await
}

#[cfg(not(feature = "api"))]
async fn serve(_engine: Arc<FeeEngine>, _config: &AppConfig) -> Result<()> {
    bail!("this build has no HTTP API; rebuild with --features api")
}
