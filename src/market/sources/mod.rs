//! Snapshot source implementations (synthetic generator, HTTP upstream)

mod http;
mod synthetic;

pub use http::HttpSnapshotSource;
pub use synthetic::SyntheticSource;
