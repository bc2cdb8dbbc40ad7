//! Error types for the fee engine.
//!
//! Every failure is terminal for the request that produced it; nothing is
//! retried inside the engine.

use thiserror::Error;

use crate::types::Network;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("unknown token {symbol} on {network}")]
    UnknownToken { symbol: String, network: Network },

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("empty snapshot: {0}")]
    EmptySnapshot(String),

    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl EngineError {
    /// Stable machine-readable code for the transport layer.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::UnknownToken { .. } => "unknown_token",
            EngineError::UpstreamUnavailable(_) => "upstream_unavailable",
            EngineError::InvalidAmount(_) => "invalid_amount",
            EngineError::EmptySnapshot(_) => "empty_snapshot",
            EngineError::MalformedSnapshot(_) => "malformed_snapshot",
            EngineError::MissingParameter(_) => "missing_parameter",
            EngineError::InvalidRequest(_) => "invalid_request",
        }
    }

    /// True when the caller sent something the engine cannot act on.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            EngineError::UnknownToken { .. }
                | EngineError::InvalidAmount(_)
                | EngineError::MissingParameter(_)
                | EngineError::InvalidRequest(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinct() {
        let errors = [
            EngineError::UnknownToken {
                symbol: "FOO".to_string(),
                network: Network::Testnet,
            },
            EngineError::UpstreamUnavailable("down".to_string()),
            EngineError::InvalidAmount("0".to_string()),
            EngineError::EmptySnapshot("no trades".to_string()),
            EngineError::MalformedSnapshot("negative".to_string()),
            EngineError::MissingParameter("amount"),
            EngineError::InvalidRequest("bad json".to_string()),
        ];
        let mut kinds: Vec<&str> = errors.iter().map(|e| e.kind()).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn test_unknown_token_message_names_symbol_and_network() {
        let err = EngineError::UnknownToken {
            symbol: "WBTC".to_string(),
            network: Network::Mainnet,
        };
        assert_eq!(err.to_string(), "unknown token WBTC on mainnet");
        assert!(err.is_client_error());
    }
}
