use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    constants::{
        TRANSFER_REASON, TRANSFER_STATUS_FAILED, TRANSFER_STATUS_OTP, WITHDRAWAL_REFERENCE_PREFIX,
    },
    db::LedgerStore,
    error::{AppError, Result},
    integrations::{PaymentGateway, TransferRecipient, TransferRequest},
    models::{
        to_minor_units, ConversionSettings, NewTransaction, PayoutDetails, Session, Transaction,
        TransactionStatus, TransactionType, TransferReceipt, Wallet,
    },
    utils::{
        generate_reference, validate_account_number, validate_bank_code, validate_naira_amount,
    },
};

use super::WalletService;

#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawalRequest {
    pub amount: Decimal,
    pub account_number: String,
    pub bank_code: String,
    /// Name returned by account verification; empty means "not verified".
    pub account_name: String,
}

#[derive(Debug, Serialize)]
pub struct WithdrawalOutcome {
    pub transaction: Transaction,
    pub wallet: Wallet,
}

fn validate_withdrawal(request: &WithdrawalRequest, settings: &ConversionSettings) -> Result<()> {
    if request.amount <= Decimal::ZERO || request.amount < settings.min_withdrawal {
        return Err(AppError::BadRequest(format!(
            "Minimum withdrawal amount is ₦{}",
            settings.min_withdrawal.normalize()
        )));
    }
    validate_naira_amount(request.amount)?;
    validate_bank_code(&request.bank_code)?;
    validate_account_number(&request.account_number)?;
    if request.account_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Please verify your account details first".to_string(),
        ));
    }
    Ok(())
}

/// Withdrawal path: processing ledger row, recipient + transfer on the
/// gateway, then an immediate debit once the transfer is accepted.
pub struct WithdrawalService {
    ledger: Arc<dyn LedgerStore>,
    gateway: Arc<dyn PaymentGateway>,
}

impl WithdrawalService {
    pub fn new(ledger: Arc<dyn LedgerStore>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { ledger, gateway }
    }

    pub async fn withdraw(
        &self,
        session: &Session,
        request: WithdrawalRequest,
    ) -> Result<WithdrawalOutcome> {
        let wallets = WalletService::new(self.ledger.clone());
        let settings = wallets.conversion_settings().await;
        validate_withdrawal(&request, &settings)?;

        let wallet = wallets.get_or_create(session).await?;

        let coins = settings.to_ledger_units(request.amount)?;
        if coins > wallet.balance {
            tracing::info!(
                "Withdrawal rejected wallet={} coins={} balance={}",
                wallet.id,
                coins,
                wallet.balance
            );
            return Err(AppError::InsufficientBalance);
        }
        let amount_kobo = to_minor_units(request.amount)?;

        let account_number = request.account_number.trim().to_string();
        let bank_code = request.bank_code.trim().to_string();
        let account_name = request.account_name.trim().to_string();
        let reference = generate_reference(WITHDRAWAL_REFERENCE_PREFIX);

        let transaction = self
            .ledger
            .insert_transaction(NewTransaction {
                wallet_id: wallet.id,
                tx_type: TransactionType::Withdrawal,
                amount: coins,
                status: TransactionStatus::Processing,
                reference: reference.clone(),
                payout_details: Some(PayoutDetails {
                    account_number: account_number.clone(),
                    bank_code: bank_code.clone(),
                    account_name: account_name.clone(),
                    recipient_code: None,
                    transfer_code: None,
                }),
            })
            .await?;

        tracing::info!(
            "Created processing withdrawal {} ref={} coins={}",
            transaction.id,
            reference,
            coins
        );

        let recipient = TransferRecipient::nuban(&account_name, &account_number, &bank_code);
        let recipient_code = match self.gateway.create_transfer_recipient(&recipient).await {
            Ok(code) => code,
            Err(e) => return Err(self.fail(&transaction, e).await),
        };

        let transfer = TransferRequest::from_balance(
            amount_kobo,
            &recipient_code,
            TRANSFER_REASON,
            &reference,
        );
        // An `otp` transfer is parked until someone finalizes it, so it is not
        // an acceptance and must not debit.
        let result = match self.gateway.initiate_transfer(&transfer).await {
            Ok(result)
                if matches!(
                    result.status.as_deref(),
                    Some(TRANSFER_STATUS_FAILED) | Some(TRANSFER_STATUS_OTP)
                ) =>
            {
                let err = AppError::Gateway("Failed to process withdrawal".to_string());
                return Err(self.fail(&transaction, err).await);
            }
            Ok(result) => result,
            Err(e) => return Err(self.fail(&transaction, e).await),
        };

        let receipt = TransferReceipt {
            recipient_code,
            transfer_code: result.transfer_code,
        };

        // Debit on acceptance, not on settlement of the transfer.
        let wallet = self
            .ledger
            .complete_withdrawal(transaction.id, &receipt)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Transfer {} accepted but withdrawal {} was not settled: {}",
                    receipt.transfer_code,
                    transaction.id,
                    e
                );
                e
            })?;

        tracing::info!(
            "Withdrawal {} completed transfer={} new_balance={}",
            transaction.id,
            receipt.transfer_code,
            wallet.balance
        );

        let transaction = self
            .ledger
            .find_wallet_transaction(wallet.id, transaction.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))?;

        Ok(WithdrawalOutcome {
            transaction,
            wallet,
        })
    }

    /// Marks the withdrawal failed and hands back the original error.
    async fn fail(&self, transaction: &Transaction, err: AppError) -> AppError {
        tracing::warn!("Withdrawal {} rejected by gateway: {}", transaction.id, err);
        match self
            .ledger
            .mark_transaction(
                transaction.id,
                TransactionStatus::Processing,
                TransactionStatus::Failed,
            )
            .await
        {
            Ok(true) => {}
            Ok(false) => tracing::warn!(
                "Withdrawal {} was no longer processing when marking failed",
                transaction.id
            ),
            Err(e) => tracing::error!(
                "Could not mark withdrawal {} as failed: {}",
                transaction.id,
                e
            ),
        }
        err
    }
}
