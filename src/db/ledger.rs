use uuid::Uuid;

use crate::{
    error::Result,
    models::{HistoryFilter, NewTransaction, Transaction, TransactionStatus, TransferReceipt, Wallet},
};

/// Storage seam for wallets, wallet transactions and system settings.
///
/// Balance changes only happen through `complete_deposit` and
/// `complete_withdrawal`, each of which moves the owning transaction to
/// `completed` in the same unit of work.
#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync {
    async fn find_wallet_by_user(&self, user_id: Uuid) -> Result<Option<Wallet>>;

    /// Creates an empty wallet for the user, or returns the existing one.
    async fn create_wallet(&self, user_id: Uuid) -> Result<Wallet>;

    async fn load_setting(&self, key: &str) -> Result<Option<serde_json::Value>>;

    async fn insert_transaction(&self, tx: NewTransaction) -> Result<Transaction>;

    async fn find_transaction_by_reference(&self, reference: &str) -> Result<Option<Transaction>>;

    async fn find_wallet_transaction(
        &self,
        wallet_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<Option<Transaction>>;

    /// Newest first. Returns the page and the total matching count.
    async fn list_transactions(
        &self,
        wallet_id: Uuid,
        filter: HistoryFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Transaction>, i64)>;

    /// Conditional status update; `false` when the row was not in `from`.
    async fn mark_transaction(
        &self,
        transaction_id: Uuid,
        from: TransactionStatus,
        to: TransactionStatus,
    ) -> Result<bool>;

    /// pending deposit -> completed and credit its wallet. `None` when the
    /// deposit was no longer pending (replayed confirmation).
    async fn complete_deposit(&self, transaction_id: Uuid) -> Result<Option<Wallet>>;

    /// processing withdrawal -> completed and debit its wallet, guarded by
    /// `balance >= amount`. Fails with `InsufficientBalance` when the guard
    /// does not hold, leaving both rows untouched.
    async fn complete_withdrawal(
        &self,
        transaction_id: Uuid,
        receipt: &TransferReceipt,
    ) -> Result<Wallet>;
}
