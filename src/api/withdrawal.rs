use axum::{extract::State, http::HeaderMap, Json};

use crate::{
    error::Result,
    models::ApiResponse,
    services::{WithdrawalOutcome, WithdrawalRequest, WithdrawalService},
};

use super::{require_session, AppState};

/// POST /api/v1/wallet/withdrawals
pub async fn create_withdrawal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<WithdrawalRequest>,
) -> Result<Json<ApiResponse<WithdrawalOutcome>>> {
    let session = require_session(&headers, &state).await?;

    let service = WithdrawalService::new(state.ledger.clone(), state.gateway.clone());
    let outcome = service.withdraw(&session, req).await?;

    Ok(Json(ApiResponse::success(outcome)))
}
