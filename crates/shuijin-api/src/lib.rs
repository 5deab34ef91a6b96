//! shuijin-api - HTTP API layer for the gateway slot tracker
//!
//! Exposes the slot store over two routes: gateways report batches of slot
//! values to `POST /api/gw/{code}`, and `GET /api/gw` returns every slot.
//! A web front-end can be served from a directory for everything else.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use shuijin_api::{create_router, AppState};
//! use shuijin_core::{GatewayAllowList, SlotStore};
//!
//! let state = AppState::new(Arc::new(SlotStore::new(40)), GatewayAllowList::default());
//! let router = create_router(state);
//! ```

pub mod assets;
pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the shuijin router with the given application state
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Gateway routes
        .route("/api/gw", get(handlers::gateway::snapshot))
        .route("/api/gw/{code}", post(handlers::gateway::report));

    // Front-end assets for everything else
    if let Some(dir) = state.ui_dir() {
        tracing::info!(dir = %dir.display(), "Serving UI assets");
        router = router.fallback_service(assets::router(dir));
    }

    router
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
