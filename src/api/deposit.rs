use axum::{
    extract::State,
    http::{header::ORIGIN, HeaderMap},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    error::Result,
    models::ApiResponse,
    services::{DepositInfo, DepositService},
};

use super::{require_session, AppState};

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    /// Naira.
    pub amount: Decimal,
}

/// Where the checkout page sends the payer back: the configured URL, else
/// the caller's origin + `/wallet`.
fn callback_url(configured: Option<&str>, headers: &HeaderMap) -> Option<String> {
    if let Some(url) = configured.map(str::trim).filter(|u| !u.is_empty()) {
        return Some(url.to_string());
    }
    let origin = headers.get(ORIGIN)?.to_str().ok()?;
    let base = url::Url::parse(origin).ok()?;
    base.join("/wallet").ok().map(|u| u.to_string())
}

/// POST /api/v1/wallet/deposits
pub async fn create_deposit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<DepositRequest>,
) -> Result<Json<ApiResponse<DepositInfo>>> {
    let session = require_session(&headers, &state).await?;
    let callback = callback_url(state.config.paystack_callback_url.as_deref(), &headers);

    let service = DepositService::new(state.ledger.clone(), state.gateway.clone());
    let deposit = service.initiate(&session, req.amount, callback).await?;

    Ok(Json(ApiResponse::success(deposit)))
}
