use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use crate::{
    error::Result,
    integrations::Bank,
    models::{ApiResponse, ConversionSettings, Wallet},
    services::{AccountVerifier, BankDirectory, VerifiedAccount, WalletService},
};

use super::{require_session, AppState};

#[derive(Debug, Deserialize)]
pub struct ResolveAccountQuery {
    pub account_number: String,
    pub bank_code: String,
}

/// GET /api/v1/wallet
pub async fn get_wallet(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Wallet>>> {
    let session = require_session(&headers, &state).await?;
    let wallet = WalletService::new(state.ledger.clone())
        .get_or_create(&session)
        .await?;
    Ok(Json(ApiResponse::success(wallet)))
}

/// GET /api/v1/wallet/conversion
pub async fn get_conversion(
    State(state): State<AppState>,
) -> Json<ApiResponse<ConversionSettings>> {
    let settings = WalletService::new(state.ledger.clone())
        .conversion_settings()
        .await;
    Json(ApiResponse::success(settings))
}

/// GET /api/v1/banks
pub async fn list_banks(State(state): State<AppState>) -> Json<ApiResponse<Vec<Bank>>> {
    let directory = BankDirectory::new(
        state.gateway.clone(),
        Some(state.redis.clone()),
        state.config.bank_cache_ttl_secs,
    );
    Json(ApiResponse::success(directory.list().await))
}

/// GET /api/v1/wallet/accounts/resolve
pub async fn resolve_account(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ResolveAccountQuery>,
) -> Result<Json<ApiResponse<VerifiedAccount>>> {
    let session = require_session(&headers, &state).await?;
    tracing::debug!("Resolving account for user {}", session.user_id);

    let account = AccountVerifier::new(state.gateway.clone())
        .verify(&query.account_number, &query.bank_code)
        .await?;
    Ok(Json(ApiResponse::success(account)))
}
