//! Application state for the shuijin API

use std::path::{Path, PathBuf};
use std::sync::Arc;

use shuijin_core::{GatewayAllowList, SlotStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// The one slot store of this process
    store: Arc<SlotStore>,
    /// Gateway codes allowed to report
    gateways: Arc<GatewayAllowList>,
    /// Directory of the web front-end, if served
    ui_dir: Option<Arc<PathBuf>>,
}

impl AppState {
    /// Create a new AppState around an existing store
    pub fn new(store: Arc<SlotStore>, gateways: GatewayAllowList) -> Self {
        Self {
            store,
            gateways: Arc::new(gateways),
            ui_dir: None,
        }
    }

    /// Serve static front-end assets from `dir`
    pub fn with_ui_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.ui_dir = Some(Arc::new(dir.into()));
        self
    }

    pub fn store(&self) -> &SlotStore {
        &self.store
    }

    pub fn gateways(&self) -> &GatewayAllowList {
        &self.gateways
    }

    pub fn ui_dir(&self) -> Option<&Path> {
        self.ui_dir.as_deref().map(PathBuf::as_path)
    }
}
