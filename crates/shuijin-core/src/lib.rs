//! shuijin-core - Slot store and gateway update semantics
//!
//! This crate holds the only stateful part of shuijin: a fixed-size,
//! pre-provisioned store of gateway slots guarded by a single readers-writer
//! lock, plus the rules that turn a gateway report into slot writes.
//! It knows nothing about HTTP; the API layer hands it a validated
//! [`GatewayCode`] and a decoded [`UpdateBatch`] and asks it for JSON.

pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod store;

pub use config::{GatewayConfig, StoreConfig};
pub use error::{ConfigError, GatewayError, StoreError, StoreResult};
pub use gateway::{GatewayAllowList, GatewayCode, UpdateBatch};
pub use models::{slot_key, Slot};
pub use store::SlotStore;
