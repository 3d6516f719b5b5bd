use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::{
    constants::PAYSTACK_SIGNATURE_HEADER,
    error::Result,
    services::{webhook_service::parse_event, WebhookOutcome, WebhookService},
};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
}

/// POST /paystack/webhook
///
/// The signature header is not verified; only its presence is recorded.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>> {
    let signed = headers.contains_key(PAYSTACK_SIGNATURE_HEADER);
    tracing::debug!("Paystack webhook received signed={} bytes={}", signed, body.len());

    let event = parse_event(&body)?;
    let service = WebhookService::new(state.ledger.clone());
    match service.handle(event).await? {
        WebhookOutcome::Credited { transaction_id, .. } => {
            tracing::debug!("Webhook settled deposit {}", transaction_id)
        }
        WebhookOutcome::AlreadyProcessed { transaction_id } => {
            tracing::debug!("Webhook replay for {}", transaction_id)
        }
        WebhookOutcome::Ignored { reason } => tracing::debug!("Webhook ignored: {}", reason),
    }

    Ok(Json(WebhookAck { status: "success" }))
}
