use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    constants::EXPORT_ROW_LIMIT,
    db::LedgerStore,
    error::{AppError, Result},
    models::{
        ConversionSettings, HistoryFilter, PaginatedResponse, Session, StatusBadge, Transaction,
    },
};

use super::WalletService;

/// Presentation block shown next to each ledger row.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionDisplay {
    pub badge: StatusBadge,
    /// `+5` / `-2.5`
    pub signed_amount: String,
    /// Naira equivalent at the current rate.
    pub currency_amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub display: TransactionDisplay,
}

impl TransactionView {
    fn new(transaction: Transaction, settings: &ConversionSettings) -> Result<Self> {
        let display = TransactionDisplay {
            badge: transaction.status.badge(),
            signed_amount: format!(
                "{}{}",
                transaction.tx_type.sign(),
                transaction.amount.normalize()
            ),
            currency_amount: settings.to_currency_units(transaction.amount)?,
        };
        Ok(Self {
            transaction,
            display,
        })
    }
}

fn csv_header() -> &'static str {
    "Date,Type,Status,Amount,Naira Value,Reference\n"
}

fn format_csv_row(tx: &Transaction, settings: &ConversionSettings) -> Result<String> {
    Ok(format!(
        "{},{},{},{},{},{}\n",
        tx.created_at.format("%Y-%m-%d %H:%M:%S"),
        tx.tx_type,
        tx.status,
        tx.amount.normalize(),
        settings.to_currency_units(tx.amount)?,
        tx.reference,
    ))
}

pub struct TransactionHistoryService {
    ledger: Arc<dyn LedgerStore>,
}

impl TransactionHistoryService {
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self { ledger }
    }

    /// Caller's transactions, newest first. `page` is 1-based.
    pub async fn get_history(
        &self,
        session: &Session,
        filter: HistoryFilter,
        page: i32,
        limit: i32,
    ) -> Result<PaginatedResponse<TransactionView>> {
        let page = page.max(1);
        let wallets = WalletService::new(self.ledger.clone());
        let wallet = wallets.get_or_create(session).await?;
        let settings = wallets.conversion_settings().await;

        let offset = (page as i64 - 1) * limit as i64;
        let (transactions, total) = self
            .ledger
            .list_transactions(wallet.id, filter, offset, limit as i64)
            .await?;

        let items = transactions
            .into_iter()
            .map(|tx| TransactionView::new(tx, &settings))
            .collect::<Result<Vec<_>>>()?;

        Ok(PaginatedResponse {
            items,
            page,
            limit,
            total,
        })
    }

    pub async fn get_details(&self, session: &Session, transaction_id: Uuid) -> Result<TransactionView> {
        let wallets = WalletService::new(self.ledger.clone());
        let wallet = wallets.get_or_create(session).await?;
        let transaction = self
            .ledger
            .find_wallet_transaction(wallet.id, transaction_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))?;

        let settings = wallets.conversion_settings().await;
        TransactionView::new(transaction, &settings)
    }

    pub async fn export_csv(&self, session: &Session, filter: HistoryFilter) -> Result<String> {
        let wallets = WalletService::new(self.ledger.clone());
        let wallet = wallets.get_or_create(session).await?;
        let settings = wallets.conversion_settings().await;

        let (transactions, total) = self
            .ledger
            .list_transactions(wallet.id, filter, 0, EXPORT_ROW_LIMIT as i64)
            .await?;
        if total > EXPORT_ROW_LIMIT as i64 {
            tracing::warn!(
                "CSV export for wallet {} truncated to {} of {} rows",
                wallet.id,
                EXPORT_ROW_LIMIT,
                total
            );
        }

        let mut csv = String::from(csv_header());
        for tx in &transactions {
            csv.push_str(&format_csv_row(tx, &settings)?);
        }
        Ok(csv)
    }
}
