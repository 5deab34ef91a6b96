//! Tunables for the slot store and the gateway allow-list

use serde::Deserialize;

use crate::error::ConfigError;

/// Default number of provisioned slots
pub const DEFAULT_STORE_SIZE: usize = 40;

/// Gateway codes accepted when none are configured
pub const DEFAULT_GATEWAY_CODES: [&str; 5] = ["241", "242", "243", "244", "245"];

/// `[store]` section
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    /// Number of slots, keyed `k1` through `k{size}`
    pub size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_STORE_SIZE,
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::EmptyStore);
        }
        Ok(())
    }
}

/// `[gateway]` section
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Codes accepted on `POST /api/gw/{code}`
    pub codes: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            codes: DEFAULT_GATEWAY_CODES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.codes.is_empty() {
            return Err(ConfigError::NoGateways);
        }
        if self.codes.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigError::BlankGatewayCode);
        }
        Ok(())
    }
}
