//! Token registry
//!
//! Symbol -> on-chain token mapping per network. The registry is built once
//! at startup and shared read-only for the life of the process.

use ethers::types::Address;
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{EngineError, Result};
use crate::types::{Network, TradingPair};

static REGISTRY: OnceLock<TokenRegistry> = OnceLock::new();

/// RPC endpoint and chain id for a network
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    pub rpc_url: String,
    pub chain_id: u64,
}

/// Static description of one token on one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    pub address: Address,
}

/// Raw registry row before address parsing
#[derive(Debug, Clone, Copy)]
pub struct TokenSpec {
    pub network: Network,
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: u8,
    pub address: &'static str,
}

const ZERO: &str = "0x0000000000000000000000000000000000000000";
const GOERLI_TEST_TOKEN: &str = "0x7E07E15D2a87A24492740D16f5bdF58c16db0c4E";

const BUILTIN_TOKENS: &[TokenSpec] = &[
    TokenSpec {
        network: Network::Mainnet,
        symbol: "ETH",
        name: "Ethereum",
        decimals: 18,
        address: ZERO,
    },
    TokenSpec {
        network: Network::Mainnet,
        symbol: "USDC",
        name: "USD Coin",
        decimals: 6,
        address: "0x7F5c764cBc14f9669B88837ca1490cCa17c31607",
    },
    TokenSpec {
        network: Network::Mainnet,
        symbol: "DAI",
        name: "DAI Stablecoin",
        decimals: 18,
        address: "0xDA10009cBd5D07dd0CeCc66161FC93D7c9000da1",
    },
    TokenSpec {
        network: Network::Mainnet,
        symbol: "EURC",
        name: "Euro Coin",
        decimals: 6,
        address: "0x4c5D5234f232BD2D76311e307852Bd9C29701C9F",
    },
    TokenSpec {
        network: Network::Mainnet,
        symbol: "xDAI",
        name: "xDAI",
        decimals: 18,
        address: "0x4c5D5234f232BD2D76311e307852Bd9C29701C9F",
    },
    TokenSpec {
        network: Network::Testnet,
        symbol: "ETH",
        name: "Ethereum",
        decimals: 18,
        address: ZERO,
    },
    TokenSpec {
        network: Network::Testnet,
        symbol: "USDC",
        name: "USD Coin",
        decimals: 6,
        address: GOERLI_TEST_TOKEN,
    },
    TokenSpec {
        network: Network::Testnet,
        symbol: "DAI",
        name: "DAI Stablecoin",
        decimals: 18,
        address: GOERLI_TEST_TOKEN,
    },
    TokenSpec {
        network: Network::Testnet,
        symbol: "EURC",
        name: "Euro Coin",
        decimals: 6,
        address: GOERLI_TEST_TOKEN,
    },
    TokenSpec {
        network: Network::Testnet,
        symbol: "xDAI",
        name: "xDAI",
        decimals: 18,
        address: GOERLI_TEST_TOKEN,
    },
];

#[derive(Debug, Clone)]
pub struct TokenRegistry {
    tokens: HashMap<Network, HashMap<String, TokenInfo>>,
    networks: HashMap<Network, NetworkInfo>,
}

impl TokenRegistry {
    /// Build a registry from raw rows. Fails on the first bad address.
    pub fn from_specs(specs: &[TokenSpec]) -> anyhow::Result<Self> {
        let mut tokens: HashMap<Network, HashMap<String, TokenInfo>> = HashMap::new();
        for row in specs {
            let address = Address::from_str(row.address).map_err(|e| {
                anyhow::anyhow!(
                    "invalid address {} for {} on {}: {}",
                    row.address,
                    row.symbol,
                    row.network,
                    e
                )
            })?;
            tokens.entry(row.network).or_default().insert(
                row.symbol.to_string(),
                TokenInfo {
                    symbol: row.symbol.to_string(),
                    name: row.name.to_string(),
                    decimals: row.decimals,
                    address,
                },
            );
        }

        let networks = HashMap::from([
            (
                Network::Mainnet,
                NetworkInfo {
                    rpc_url: "https://mainnet.optimism.io".to_string(),
                    chain_id: 10,
                },
            ),
            (
                Network::Testnet,
                NetworkInfo {
                    rpc_url: "https://goerli.optimism.io".to_string(),
                    chain_id: 420,
                },
            ),
        ]);

        Ok(Self { tokens, networks })
    }

    /// Registry with the tokens deployed on Optimism
    pub fn builtin() -> Self {
        Self::from_specs(BUILTIN_TOKENS).expect("built-in token table has valid addresses")
    }

    /// Process-wide registry, built from the built-in table on first use.
    pub fn global() -> &'static TokenRegistry {
        REGISTRY.get_or_init(TokenRegistry::builtin)
    }

    pub fn network(&self, network: Network) -> Option<&NetworkInfo> {
        self.networks.get(&network)
    }

    /// Look up token metadata. Symbols match exactly.
    pub fn token_data(&self, symbol: &str, network: Network) -> Result<&TokenInfo> {
        self.tokens
            .get(&network)
            .and_then(|by_symbol| by_symbol.get(symbol))
            .ok_or_else(|| EngineError::UnknownToken {
                symbol: symbol.to_string(),
                network,
            })
    }

    /// Resolve a symbol to its address.
    pub fn resolve(&self, symbol: &str, network: Network) -> Result<Address> {
        self.token_data(symbol, network).map(|t| t.address)
    }

    /// Resolve both sides of a pair, base first.
    pub fn resolve_pair(&self, pair: &TradingPair, network: Network) -> Result<(Address, Address)> {
        let base = self.resolve(&pair.base, network)?;
        let quote = self.resolve(&pair.quote, network)?;
        Ok((base, quote))
    }

    /// Symbols known on a network, sorted
    pub fn symbols(&self, network: Network) -> Vec<&str> {
        let mut symbols: Vec<&str> = self
            .tokens
            .get(&network)
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default();
        symbols.sort_unstable();
        symbols
    }
}
