use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    constants::DEPOSIT_REFERENCE_PREFIX,
    db::LedgerStore,
    error::{AppError, Result},
    integrations::{InitializePayment, PaymentGateway},
    models::{
        to_minor_units, ConversionSettings, NewTransaction, Session, TransactionStatus,
        TransactionType,
    },
    utils::{generate_reference, validate_naira_amount},
};

use super::WalletService;

fn validate_deposit_amount(amount: Decimal, settings: &ConversionSettings) -> Result<()> {
    if amount <= Decimal::ZERO || amount < settings.min_deposit {
        return Err(AppError::BadRequest(format!(
            "Minimum deposit amount is ₦{}",
            settings.min_deposit.normalize()
        )));
    }
    validate_naira_amount(amount)
}

/// Deposit path: pending ledger row first, then a hosted checkout. The row is
/// settled later by the `charge.success` webhook.
pub struct DepositService {
    ledger: Arc<dyn LedgerStore>,
    gateway: Arc<dyn PaymentGateway>,
}

impl DepositService {
    pub fn new(ledger: Arc<dyn LedgerStore>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { ledger, gateway }
    }

    pub async fn initiate(
        &self,
        session: &Session,
        amount: Decimal,
        callback_url: Option<String>,
    ) -> Result<DepositInfo> {
        let email = session.require_email()?.to_string();

        let wallets = WalletService::new(self.ledger.clone());
        let settings = wallets.conversion_settings().await;
        validate_deposit_amount(amount, &settings)?;

        let wallet = wallets.get_or_create(session).await?;

        let ledger_amount = settings.to_ledger_units(amount)?;
        let amount_kobo = to_minor_units(amount)?;
        let reference = generate_reference(DEPOSIT_REFERENCE_PREFIX);

        let transaction = self
            .ledger
            .insert_transaction(NewTransaction {
                wallet_id: wallet.id,
                tx_type: TransactionType::Deposit,
                amount: ledger_amount,
                status: TransactionStatus::Pending,
                reference: reference.clone(),
                payout_details: None,
            })
            .await
            .map_err(|e| {
                tracing::error!("Transaction creation error for wallet {}: {}", wallet.id, e);
                e
            })?;

        tracing::info!(
            "Created pending deposit {} ref={} amount={} coins={}",
            transaction.id,
            reference,
            amount,
            ledger_amount
        );

        // A failed initialize leaves the row pending; nothing is rolled back.
        let checkout = self
            .gateway
            .initialize_payment(&InitializePayment {
                email,
                amount: amount_kobo,
                callback_url,
                reference: reference.clone(),
            })
            .await
            .map_err(|e| {
                tracing::warn!("Payment initialization failed ref={}: {}", reference, e);
                e
            })?;

        Ok(DepositInfo {
            transaction_id: transaction.id,
            reference,
            amount,
            ledger_amount,
            status: transaction.status,
            authorization_url: checkout.authorization_url,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DepositInfo {
    pub transaction_id: Uuid,
    pub reference: String,
    pub amount: Decimal,
    pub ledger_amount: Decimal,
    pub status: TransactionStatus,
    pub authorization_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::CONVERSION_SETTINGS_KEY, db::memory::MemoryLedger,
        services::test_support::ScriptedGateway,
    };

    fn session() -> Session {
        Session::new(Uuid::new_v4(), Some("player@chess.ng".into()))
    }

    #[tokio::test]
    async fn deposit_creates_pending_transaction_in_ledger_units() {
        // 5000 naira at 1000 naira/coin -> 5 coins, pending
        let ledger = Arc::new(MemoryLedger::new());
        let gateway = Arc::new(ScriptedGateway::ok());
        let service = DepositService::new(ledger.clone(), gateway.clone());

        let info = service
            .initiate(&session(), Decimal::from(5000), None)
            .await
            .unwrap();

        assert_eq!(info.ledger_amount, Decimal::from(5));
        assert_eq!(info.status, TransactionStatus::Pending);
        assert!(info.reference.starts_with("chess_"));
        assert!(info.authorization_url.ends_with(&info.reference));

        let rows = ledger.transactions().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, Decimal::from(5));
        assert_eq!(rows[0].tx_type, TransactionType::Deposit);
        assert_eq!(rows[0].status, TransactionStatus::Pending);
        assert_eq!(rows[0].reference, info.reference);

        assert_eq!(
            gateway.calls(),
            vec![format!("initialize:{}:500000", info.reference)]
        );
    }

    #[tokio::test]
    async fn deposit_uses_configured_rate() {
        let ledger = Arc::new(MemoryLedger::new());
        ledger
            .put_setting(
                CONVERSION_SETTINGS_KEY,
                serde_json::json!({ "naira_to_coin": 400, "min_deposit": 500 }),
            )
            .await;
        let service = DepositService::new(ledger.clone(), Arc::new(ScriptedGateway::ok()));

        let info = service.initiate(&session(), Decimal::from(600), None).await.unwrap();
        assert_eq!(info.ledger_amount, "1.5".parse::<Decimal>().unwrap());
    }

    #[tokio::test]
    async fn deposit_below_minimum_is_rejected_before_any_write() {
        let ledger = Arc::new(MemoryLedger::new());
        let gateway = Arc::new(ScriptedGateway::ok());
        let service = DepositService::new(ledger.clone(), gateway.clone());

        let err = service
            .initiate(&session(), Decimal::from(999), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("1000")));
        assert!(ledger.transactions().await.is_empty());
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn deposit_requires_email() {
        let ledger = Arc::new(MemoryLedger::new());
        let service = DepositService::new(ledger.clone(), Arc::new(ScriptedGateway::ok()));

        let err = service
            .initiate(&Session::new(Uuid::new_v4(), None), Decimal::from(5000), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(ledger.transactions().await.is_empty());
    }

    #[tokio::test]
    async fn gateway_failure_leaves_transaction_pending() {
        // Memastikan transaksi tetap pending saat Paystack gagal
        let ledger = Arc::new(MemoryLedger::new());
        let gateway = Arc::new(ScriptedGateway::ok().failing_initialize("Invalid key"));
        let service = DepositService::new(ledger.clone(), gateway);

        let err = service
            .initiate(&session(), Decimal::from(5000), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Gateway(_)));
        let rows = ledger.transactions().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, TransactionStatus::Pending);
    }

    #[tokio::test]
    async fn store_failure_skips_gateway() {
        let ledger = Arc::new(MemoryLedger::new());
        ledger.fail_inserts(true);
        let gateway = Arc::new(ScriptedGateway::ok());
        let service = DepositService::new(ledger.clone(), gateway.clone());

        let err = service
            .initiate(&session(), Decimal::from(5000), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn oversized_deposit_is_rejected_before_any_write() {
        // Memastikan nominal raksasa ditolak tanpa panic dan tanpa penulisan
        let ledger = Arc::new(MemoryLedger::new());
        let gateway = Arc::new(ScriptedGateway::ok());
        let service = DepositService::new(ledger.clone(), gateway.clone());

        let amount: Decimal = "1000000000000000000000000000".parse().unwrap();
        let err = service.initiate(&session(), amount, None).await.unwrap_err();

        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Amount is out of range"));
        assert!(ledger.transactions().await.is_empty());
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn sub_kobo_deposit_is_rejected() {
        let ledger = Arc::new(MemoryLedger::new());
        let gateway = Arc::new(ScriptedGateway::ok());
        let service = DepositService::new(ledger.clone(), gateway.clone());

        let amount: Decimal = "1000.005".parse().unwrap();
        let err = service.initiate(&session(), amount, None).await.unwrap_err();

        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("decimal places")));
        assert!(ledger.transactions().await.is_empty());
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn demo_flag_does_not_block_deposits() {
        let ledger = Arc::new(MemoryLedger::new());
        let session = session();
        ledger.mark_demo(session.user_id).await;
        let service = DepositService::new(ledger.clone(), Arc::new(ScriptedGateway::ok()));

        let info = service
            .initiate(&session, Decimal::from(5000), None)
            .await
            .unwrap();
        assert_eq!(info.status, TransactionStatus::Pending);
        assert_eq!(ledger.transactions().await.len(), 1);
    }
}
