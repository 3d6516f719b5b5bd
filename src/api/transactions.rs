use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    constants::DEFAULT_PAGE_LIMIT,
    error::{AppError, Result},
    models::{ApiResponse, HistoryFilter, PaginatedResponse, TransactionStatus, TransactionType},
    services::{TransactionHistoryService, TransactionView},
    utils::ensure_page_limit,
};

use super::{require_session, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(rename = "type")]
    pub tx_type: Option<String>,
    pub status: Option<String>,
    pub page: Option<i32>,
    pub limit: Option<i32>,
}

fn parse_enum<T: serde::de::DeserializeOwned>(raw: Option<&str>, field: &str) -> Result<Option<T>> {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty() && *v != "all") else {
        return Ok(None);
    };
    serde_json::from_value(serde_json::Value::String(value.to_ascii_lowercase()))
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("Unknown {} filter: {}", field, value)))
}

fn parse_filter(query: &HistoryQuery) -> Result<HistoryFilter> {
    Ok(HistoryFilter {
        tx_type: parse_enum::<TransactionType>(query.tx_type.as_deref(), "type")?,
        status: parse_enum::<TransactionStatus>(query.status.as_deref(), "status")?,
    })
}

/// GET /api/v1/wallet/transactions
pub async fn get_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<TransactionView>>>> {
    let session = require_session(&headers, &state).await?;

    let filter = parse_filter(&query)?;
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    ensure_page_limit(limit, state.config.max_page_limit)?;

    let service = TransactionHistoryService::new(state.ledger.clone());
    let history = service.get_history(&session, filter, page, limit).await?;

    Ok(Json(ApiResponse::success(history)))
}

/// GET /api/v1/wallet/transactions/{id}
pub async fn get_details(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TransactionView>>> {
    let session = require_session(&headers, &state).await?;

    let service = TransactionHistoryService::new(state.ledger.clone());
    let tx = service.get_details(&session, id).await?;

    Ok(Json(ApiResponse::success(tx)))
}

/// GET /api/v1/wallet/transactions/export
pub async fn export_csv(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse> {
    let session = require_session(&headers, &state).await?;
    let filter = parse_filter(&query)?;

    let service = TransactionHistoryService::new(state.ledger.clone());
    let csv = service.export_csv(&session, filter).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"transactions.csv\""),
        ],
        csv,
    ))
}
