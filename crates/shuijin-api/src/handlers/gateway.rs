//! Gateway report and snapshot handlers

use axum::body::Bytes;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use shuijin_core::{GatewayCode, UpdateBatch};

use crate::error::ApiError;
use crate::state::AppState;

/// Gateway code from the request path, checked against the allow-list
///
/// Resolved from the request head, so an unknown code is rejected before
/// the body is read.
#[derive(Debug, Clone)]
pub struct ReportingGateway(pub GatewayCode);

impl FromRequestParts<AppState> for ReportingGateway {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(code) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        Ok(Self(state.gateways().resolve(&code)?))
    }
}

/// POST /api/gw/{code}
/// Record a batch of slot values reported by one gateway
///
/// Both the code and the body are checked before any slot is written.
/// Success is an empty 200.
pub async fn report(
    State(state): State<AppState>,
    ReportingGateway(gateway): ReportingGateway,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let batch = UpdateBatch::from_json(&body)?;

    let applied = state.store().apply_now(&gateway, &batch);
    tracing::debug!(
        gateway = %gateway,
        received = batch.len(),
        applied,
        "Gateway report applied"
    );

    Ok(StatusCode::OK)
}

/// GET /api/gw
/// Current state of every slot
pub async fn snapshot(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state.store().to_json()?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}
