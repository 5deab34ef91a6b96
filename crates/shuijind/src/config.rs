//! TOML configuration for the daemon
//!
//! Every section is optional; an empty file (or no file) yields the
//! defaults: port 3068 on all interfaces, 40 slots, gateways 241-245 and
//! no UI.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use shuijin_core::{GatewayConfig, StoreConfig};

/// Port used when none is configured
pub const DEFAULT_PORT: u16 = 3068;

/// `[server]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

/// `[ui]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Directory holding the built front-end (index.html and assets)
    pub dir: Option<PathBuf>,
}

/// Top-level daemon configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub gateway: GatewayConfig,
    pub ui: UiConfig,
}

impl DaemonConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Reject configurations the store cannot be built from
    pub fn validate(&self) -> anyhow::Result<()> {
        self.store.validate().context("Invalid [store] section")?;
        self.gateway.validate().context("Invalid [gateway] section")?;
        Ok(())
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }
}
