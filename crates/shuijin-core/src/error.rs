//! Error types for the slot store and gateway updates

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by [`crate::SlotStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key is outside the provisioned key space
    #[error("Unknown slot: {0}")]
    UnknownSlot(String),

    /// Snapshot serialization failed
    #[error("Snapshot encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors raised while accepting a gateway report
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Gateway code is not on the allow-list
    #[error("Unknown gateway: {0}")]
    InvalidGateway(String),

    /// Report body is not an object of numbers
    #[error("Malformed report: {0}")]
    MalformedInput(String),
}

/// Errors in store or gateway configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("store size must be at least 1")]
    EmptyStore,

    #[error("gateway allow-list is empty")]
    NoGateways,

    #[error("gateway codes must not be blank")]
    BlankGatewayCode,
}
