use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    constants::{CHARGE_STATUS_SUCCESS, EVENT_CHARGE_SUCCESS},
    db::LedgerStore,
    error::{AppError, Result},
    models::{to_minor_units, Transaction, TransactionType},
};

use super::WalletService;

/// Paystack event envelope. `data` stays untyped until the event is known.
#[derive(Debug, Clone, Deserialize)]
pub struct PaystackEvent {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChargeData {
    pub reference: String,
    /// Minor units (kobo).
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub customer: Option<serde_json::Value>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WebhookOutcome {
    Credited {
        transaction_id: Uuid,
        wallet_id: Uuid,
        amount: Decimal,
        balance: Decimal,
    },
    AlreadyProcessed {
        transaction_id: Uuid,
    },
    Ignored {
        reason: String,
    },
}

fn invalid_payload() -> AppError {
    AppError::BadRequest("Invalid webhook payload".to_string())
}

pub fn parse_event(body: &[u8]) -> Result<PaystackEvent> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!("Rejecting webhook body: {}", e);
        invalid_payload()
    })
}

/// Settles pending deposits from `charge.success` notifications.
///
/// The credit is the ledger amount stored on the transaction, never the
/// gateway's amount. Settlement is a conditional update, so a replayed event
/// finds nothing pending and changes nothing.
pub struct WebhookService {
    ledger: Arc<dyn LedgerStore>,
}

impl WebhookService {
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self { ledger }
    }

    pub async fn handle(&self, event: PaystackEvent) -> Result<WebhookOutcome> {
        if event.event != EVENT_CHARGE_SUCCESS {
            tracing::debug!("Ignoring webhook event {}", event.event);
            return Ok(WebhookOutcome::Ignored {
                reason: format!("unhandled event {}", event.event),
            });
        }

        let charge: ChargeData = serde_json::from_value(event.data).map_err(|e| {
            tracing::warn!("Malformed charge.success data: {}", e);
            invalid_payload()
        })?;

        if charge.status.as_deref() != Some(CHARGE_STATUS_SUCCESS) {
            tracing::info!(
                "Ignoring charge {} with status {:?}",
                charge.reference,
                charge.status
            );
            return Ok(WebhookOutcome::Ignored {
                reason: "charge not successful".to_string(),
            });
        }

        let transaction = self
            .ledger
            .find_transaction_by_reference(&charge.reference)
            .await?
            .ok_or_else(|| {
                tracing::error!("Transaction not found for reference {}", charge.reference);
                AppError::NotFound("Transaction not found".to_string())
            })?;

        if transaction.tx_type != TransactionType::Deposit {
            tracing::warn!("charge.success for non-deposit reference {}", charge.reference);
            return Ok(WebhookOutcome::Ignored {
                reason: "reference is not a deposit".to_string(),
            });
        }

        if transaction.status.is_terminal() {
            tracing::warn!(
                "Replayed charge.success for {} (status {}); no credit applied",
                charge.reference,
                transaction.status
            );
            return Ok(WebhookOutcome::AlreadyProcessed {
                transaction_id: transaction.id,
            });
        }

        if let Some(email) = charge.customer.as_ref().and_then(|c| c.get("email")) {
            tracing::debug!("Charge {} paid by {}", charge.reference, email);
        }
        self.cross_check_amount(&transaction, &charge).await;

        match self.ledger.complete_deposit(transaction.id).await? {
            Some(wallet) => {
                tracing::info!(
                    "Deposit {} completed ref={} credited={} new_balance={}",
                    transaction.id,
                    charge.reference,
                    transaction.amount,
                    wallet.balance
                );
                Ok(WebhookOutcome::Credited {
                    transaction_id: transaction.id,
                    wallet_id: wallet.id,
                    amount: transaction.amount,
                    balance: wallet.balance,
                })
            }
            None => {
                tracing::warn!(
                    "Replayed charge.success for {} (status {}); no credit applied",
                    charge.reference,
                    transaction.status
                );
                Ok(WebhookOutcome::AlreadyProcessed {
                    transaction_id: transaction.id,
                })
            }
        }
    }

    /// Warns when the paid kobo amount disagrees with the stored ledger
    /// amount at the current rate. Never blocks settlement.
    async fn cross_check_amount(&self, transaction: &Transaction, charge: &ChargeData) {
        let Some(paid) = charge.amount else {
            return;
        };
        let settings = WalletService::new(self.ledger.clone())
            .conversion_settings()
            .await;
        match settings
            .to_currency_units(transaction.amount)
            .and_then(to_minor_units)
        {
            Ok(expected) if expected != paid => tracing::warn!(
                "Charge {} paid {} kobo, expected {} kobo",
                charge.reference,
                paid,
                expected
            ),
            Ok(_) => {}
            Err(e) => tracing::warn!("Could not cross-check charge {}: {}", charge.reference, e),
        }
    }
}
