//! shuijin Client Library
//!
//! Typed HTTP client for the gateway slot API.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use shuijin_client::GatewayClient;
//!
//! # async fn run() -> shuijin_client::Result<()> {
//! let client = GatewayClient::new("http://localhost:3068")?;
//!
//! let values = HashMap::from([("k1".to_string(), 5.0)]);
//! client.report("241", &values).await?;
//!
//! let slots = client.snapshot().await?;
//! println!("k1 = {}", slots["k1"].value);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
pub mod testing;

pub use client::GatewayClient;
pub use error::{ClientError, Result};

// Re-export core types for convenience
pub use shuijin_core::Slot;
