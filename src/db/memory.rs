//! In-process `LedgerStore` used by service tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::types::Json;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::LedgerStore;
use crate::{
    error::{AppError, Result},
    models::{
        HistoryFilter, NewTransaction, Transaction, TransactionStatus, TransactionType,
        TransferReceipt, Wallet,
    },
};

#[derive(Default)]
struct State {
    wallets: HashMap<Uuid, Wallet>,
    transactions: Vec<Transaction>,
    settings: HashMap<String, serde_json::Value>,
    demo_users: HashSet<Uuid>,
}

#[derive(Default)]
pub struct MemoryLedger {
    state: Mutex<State>,
    fail_inserts: AtomicBool,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_setting(&self, key: &str, value: serde_json::Value) {
        self.state.lock().await.settings.insert(key.to_string(), value);
    }

    pub async fn mark_demo(&self, user_id: Uuid) {
        let mut state = self.state.lock().await;
        state.demo_users.insert(user_id);
        for wallet in state.wallets.values_mut() {
            if wallet.user_id == user_id {
                wallet.is_demo = true;
            }
        }
    }

    pub async fn seed_wallet(&self, user_id: Uuid, balance: Decimal) -> Wallet {
        let wallet = self.create_wallet(user_id).await.unwrap();
        let mut state = self.state.lock().await;
        let stored = state.wallets.get_mut(&wallet.id).unwrap();
        stored.balance = balance;
        stored.clone()
    }

    pub async fn balance(&self, wallet_id: Uuid) -> Decimal {
        self.state.lock().await.wallets[&wallet_id].balance
    }

    pub async fn transactions(&self) -> Vec<Transaction> {
        self.state.lock().await.transactions.clone()
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }
}

fn view(state: &State, wallet: &Wallet) -> Wallet {
    let mut wallet = wallet.clone();
    wallet.is_demo = state.demo_users.contains(&wallet.user_id);
    wallet
}

#[async_trait::async_trait]
impl LedgerStore for MemoryLedger {
    async fn find_wallet_by_user(&self, user_id: Uuid) -> Result<Option<Wallet>> {
        let state = self.state.lock().await;
        Ok(state
            .wallets
            .values()
            .find(|w| w.user_id == user_id)
            .map(|w| view(&state, w)))
    }

    async fn create_wallet(&self, user_id: Uuid) -> Result<Wallet> {
        let mut state = self.state.lock().await;
        if let Some(existing) = state.wallets.values().find(|w| w.user_id == user_id) {
            return Ok(view(&state, existing));
        }
        let now = Utc::now();
        let wallet = Wallet {
            id: Uuid::new_v4(),
            user_id,
            balance: Decimal::ZERO,
            is_demo: false,
            created_at: now,
            updated_at: now,
        };
        state.wallets.insert(wallet.id, wallet.clone());
        Ok(view(&state, &wallet))
    }

    async fn load_setting(&self, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.state.lock().await.settings.get(key).cloned())
    }

    async fn insert_transaction(&self, tx: NewTransaction) -> Result<Transaction> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        let mut state = self.state.lock().await;
        if state.transactions.iter().any(|t| t.reference == tx.reference) {
            return Err(AppError::Database(sqlx::Error::RowNotFound));
        }
        let now = Utc::now();
        let row = Transaction {
            id: Uuid::new_v4(),
            wallet_id: tx.wallet_id,
            tx_type: tx.tx_type,
            amount: tx.amount,
            status: tx.status,
            reference: tx.reference,
            payout_details: tx.payout_details.map(Json),
            created_at: now,
            updated_at: now,
        };
        state.transactions.push(row.clone());
        Ok(row)
    }

    async fn find_transaction_by_reference(&self, reference: &str) -> Result<Option<Transaction>> {
        let state = self.state.lock().await;
        Ok(state.transactions.iter().find(|t| t.reference == reference).cloned())
    }

    async fn find_wallet_transaction(
        &self,
        wallet_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<Option<Transaction>> {
        let state = self.state.lock().await;
        Ok(state
            .transactions
            .iter()
            .find(|t| t.id == transaction_id && t.wallet_id == wallet_id)
            .cloned())
    }

    async fn list_transactions(
        &self,
        wallet_id: Uuid,
        filter: HistoryFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Transaction>, i64)> {
        let state = self.state.lock().await;
        // Insertion order is creation order; newest first.
        let matching: Vec<Transaction> = state
            .transactions
            .iter()
            .rev()
            .filter(|t| t.wallet_id == wallet_id && filter.matches(t))
            .cloned()
            .collect();
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((items, total))
    }

    async fn mark_transaction(
        &self,
        transaction_id: Uuid,
        from: TransactionStatus,
        to: TransactionStatus,
    ) -> Result<bool> {
        if !from.can_transition_to(to) {
            return Err(AppError::Internal(format!(
                "Illegal transaction transition {} -> {}",
                from, to
            )));
        }
        let mut state = self.state.lock().await;
        match state
            .transactions
            .iter_mut()
            .find(|t| t.id == transaction_id && t.status == from)
        {
            Some(tx) => {
                tx.status = to;
                tx.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn complete_deposit(&self, transaction_id: Uuid) -> Result<Option<Wallet>> {
        let mut state = self.state.lock().await;
        let Some(tx) = state.transactions.iter_mut().find(|t| {
            t.id == transaction_id
                && t.status == TransactionStatus::Pending
                && t.tx_type == TransactionType::Deposit
        }) else {
            return Ok(None);
        };
        let (wallet_id, amount) = (tx.wallet_id, tx.amount);
        if !state.wallets.contains_key(&wallet_id) {
            return Err(AppError::NotFound(format!("Wallet {} not found", wallet_id)));
        }

        let tx = state
            .transactions
            .iter_mut()
            .find(|t| t.id == transaction_id)
            .ok_or_else(|| AppError::Internal("transaction vanished".into()))?;
        tx.status = TransactionStatus::Completed;
        tx.updated_at = Utc::now();

        let wallet = state
            .wallets
            .get_mut(&wallet_id)
            .ok_or_else(|| AppError::Internal("wallet vanished".into()))?;
        wallet.balance += amount;
        wallet.updated_at = Utc::now();
        let wallet = wallet.clone();
        Ok(Some(view(&state, &wallet)))
    }

    async fn complete_withdrawal(
        &self,
        transaction_id: Uuid,
        receipt: &TransferReceipt,
    ) -> Result<Wallet> {
        let mut state = self.state.lock().await;
        let (wallet_id, amount) = state
            .transactions
            .iter()
            .find(|t| {
                t.id == transaction_id
                    && t.status == TransactionStatus::Processing
                    && t.tx_type == TransactionType::Withdrawal
            })
            .map(|t| (t.wallet_id, t.amount))
            .ok_or_else(|| {
                AppError::Internal(format!("Withdrawal {} is no longer processing", transaction_id))
            })?;

        let balance = state
            .wallets
            .get(&wallet_id)
            .map(|w| w.balance)
            .ok_or_else(|| AppError::NotFound(format!("Wallet {} not found", wallet_id)))?;
        if balance < amount {
            return Err(AppError::InsufficientBalance);
        }

        if let Some(tx) = state.transactions.iter_mut().find(|t| t.id == transaction_id) {
            tx.status = TransactionStatus::Completed;
            tx.updated_at = Utc::now();
            if let Some(Json(details)) = tx.payout_details.as_mut() {
                details.recipient_code = Some(receipt.recipient_code.clone());
                details.transfer_code = Some(receipt.transfer_code.clone());
            }
        }

        let wallet = state
            .wallets
            .get_mut(&wallet_id)
            .ok_or_else(|| AppError::Internal("wallet vanished".into()))?;
        wallet.balance -= amount;
        wallet.updated_at = Utc::now();
        let wallet = wallet.clone();
        Ok(view(&state, &wallet))
    }
}
