//! Error types

use thiserror::Error;

/// Key-value storage failures (LocalStorage on web)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,

    #[error("write rejected for key {key}: {reason}")]
    WriteRejected { key: String, reason: String },

    #[error("serialization failed: {0}")]
    Serialize(String),
}

/// Permanent shop failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopError {
    #[error("insufficient coins: cost {cost}, balance {balance}")]
    InsufficientFunds { cost: u64, balance: u64 },
}

/// Fatal startup failures (browser only)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("no browser window")]
    NoWindow,

    #[error("no document")]
    NoDocument,

    #[error("canvas element '{0}' not found")]
    CanvasMissing(String),

    #[error("could not acquire a 2d context on the canvas")]
    ContextUnavailable,
}
