//! Configuration types and re-exports

pub use super::{
    ApiConfig, AppConfig, EngineConfig, LoggingConfig, SourceKind, SyntheticConfig, UpstreamConfig,
};
pub use crate::fees::FeePolicy;
