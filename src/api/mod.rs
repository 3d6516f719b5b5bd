// src/api/mod.rs

pub mod auth;
pub mod deposit;
pub mod health;
pub mod paystack;
pub mod transactions;
pub mod wallet;
pub mod withdrawal;

use axum::http::HeaderMap;
use std::sync::Arc;

use crate::config::Config;
use crate::db::{Database, LedgerStore};
use crate::error::Result;
use crate::integrations::PaymentGateway;
use crate::models::Session;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub ledger: Arc<dyn LedgerStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub redis: redis::aio::ConnectionManager,
    pub config: Config,
}

/// Verifies the bearer token and returns the caller's session.
pub async fn require_session(headers: &HeaderMap, state: &AppState) -> Result<Session> {
    let token = auth::bearer_token(headers)?;
    auth::session_from_token(token, &state.config.jwt_secret, &state.config.jwt_audience)
}
