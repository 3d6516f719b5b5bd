use serde::Serialize;
use std::sync::Arc;

use crate::{
    error::{AppError, Result},
    integrations::PaymentGateway,
    utils::{validate_account_number, validate_bank_code},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifiedAccount {
    pub account_number: String,
    pub bank_code: String,
    pub account_name: String,
}

/// Resolves a NUBAN account to its holder name before a withdrawal.
pub struct AccountVerifier {
    gateway: Arc<dyn PaymentGateway>,
}

impl AccountVerifier {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }

    pub async fn verify(&self, account_number: &str, bank_code: &str) -> Result<VerifiedAccount> {
        validate_bank_code(bank_code)?;
        validate_account_number(account_number)?;
        let account_number = account_number.trim();
        let bank_code = bank_code.trim();

        let resolved = self
            .gateway
            .resolve_account(account_number, bank_code)
            .await
            .map_err(|e| {
                tracing::info!("Account resolve failed bank={}: {}", bank_code, e);
                e
            })?;

        let account_name = resolved.account_name.trim().to_string();
        if account_name.is_empty() {
            return Err(AppError::Gateway("Could not verify account".to_string()));
        }

        Ok(VerifiedAccount {
            account_number: resolved
                .account_number
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| account_number.to_string()),
            bank_code: bank_code.to_string(),
            account_name,
        })
    }
}
