use sqlx::{postgres::PgPoolOptions, types::Json, PgPool, Row};
use uuid::Uuid;

use crate::{
    config::Config,
    error::{AppError, Result},
    models::*,
};

pub mod ledger;
#[cfg(test)]
pub mod memory;

pub use ledger::LedgerStore;

// Wallet rows joined with the profile flag that marks demo accounts.
const WALLET_SELECT: &str = "SELECT w.id, w.user_id, w.balance,
            COALESCE(p.is_demo, false) AS is_demo,
            w.created_at, w.updated_at
     FROM wallets w
     LEFT JOIN profiles p ON p.id = w.user_id";

// Settlement statements. The status/type guards make replays and races match
// no row; the balance guard keeps a debit from going negative.
const SETTLE_DEPOSIT_SQL: &str = r#"
    UPDATE transactions
    SET status = 'completed', updated_at = NOW()
    WHERE id = $1 AND status = 'pending' AND type = 'deposit'
    RETURNING wallet_id, amount
"#;

const CREDIT_WALLET_SQL: &str = r#"
    WITH w AS (
        UPDATE wallets
        SET balance = balance + $2, updated_at = NOW()
        WHERE id = $1
        RETURNING *
    )
    SELECT w.id, w.user_id, w.balance,
           COALESCE(p.is_demo, false) AS is_demo,
           w.created_at, w.updated_at
    FROM w
    LEFT JOIN profiles p ON p.id = w.user_id
"#;

const SETTLE_WITHDRAWAL_SQL: &str = r#"
    UPDATE transactions
    SET status = 'completed',
        payout_details = COALESCE(payout_details, '{}'::jsonb) || $2::jsonb,
        updated_at = NOW()
    WHERE id = $1 AND status = 'processing' AND type = 'withdrawal'
    RETURNING wallet_id, amount
"#;

const DEBIT_WALLET_SQL: &str = r#"
    WITH w AS (
        UPDATE wallets
        SET balance = balance - $2, updated_at = NOW()
        WHERE id = $1 AND balance >= $2
        RETURNING *
    )
    SELECT w.id, w.user_id, w.balance,
           COALESCE(p.is_demo, false) AS is_demo,
           w.created_at, w.updated_at
    FROM w
    LEFT JOIN profiles p ON p.id = w.user_id
"#;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        // migrations live at the crate root: ./migrations
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ==================== WALLET QUERIES ====================
#[async_trait::async_trait]
impl LedgerStore for Database {
    async fn find_wallet_by_user(&self, user_id: Uuid) -> Result<Option<Wallet>> {
        let wallet = sqlx::query_as::<_, Wallet>(&format!("{} WHERE w.user_id = $1", WALLET_SELECT))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(wallet)
    }

    async fn create_wallet(&self, user_id: Uuid) -> Result<Wallet> {
        sqlx::query(
            "INSERT INTO wallets (user_id, balance) VALUES ($1, 0)
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        self.find_wallet_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::Internal("Wallet creation did not persist".to_string()))
    }

    // ==================== SETTINGS QUERIES ====================
    async fn load_setting(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let value = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT value FROM system_settings WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    // ==================== TRANSACTION QUERIES ====================
    async fn insert_transaction(&self, tx: NewTransaction) -> Result<Transaction> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions
                (wallet_id, type, amount, status, reference, payout_details)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tx.wallet_id)
        .bind(tx.tx_type)
        .bind(tx.amount)
        .bind(tx.status)
        .bind(&tx.reference)
        .bind(tx.payout_details.map(Json))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_transaction_by_reference(&self, reference: &str) -> Result<Option<Transaction>> {
        let tx = sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE reference = $1")
            .bind(reference)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tx)
    }

    async fn find_wallet_transaction(
        &self,
        wallet_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<Option<Transaction>> {
        let tx = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE id = $1 AND wallet_id = $2",
        )
        .bind(transaction_id)
        .bind(wallet_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tx)
    }

    async fn list_transactions(
        &self,
        wallet_id: Uuid,
        filter: HistoryFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Transaction>, i64)> {
        let items = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT * FROM transactions
            WHERE wallet_id = $1
              AND ($2::transaction_type IS NULL OR type = $2)
              AND ($3::transaction_status IS NULL OR status = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(wallet_id)
        .bind(filter.tx_type)
        .bind(filter.status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM transactions
            WHERE wallet_id = $1
              AND ($2::transaction_type IS NULL OR type = $2)
              AND ($3::transaction_status IS NULL OR status = $3)
            "#,
        )
        .bind(wallet_id)
        .bind(filter.tx_type)
        .bind(filter.status)
        .fetch_one(&self.pool)
        .await?;

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

        let result = sqlx::query(
            "UPDATE transactions SET status = $3, updated_at = NOW()
             WHERE id = $1 AND status = $2",
        )
        .bind(transaction_id)
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn complete_deposit(&self, transaction_id: Uuid) -> Result<Option<Wallet>> {
        let mut tx = self.pool.begin().await?;

        // Only a pending deposit may be settled; replays match no row.
        let settled = sqlx::query(SETTLE_DEPOSIT_SQL)
            .bind(transaction_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = settled else {
            tx.rollback().await?;
            return Ok(None);
        };
        let wallet_id: Uuid = row.get("wallet_id");
        let amount: rust_decimal::Decimal = row.get("amount");

        let wallet = sqlx::query_as::<_, Wallet>(CREDIT_WALLET_SQL)
            .bind(wallet_id)
            .bind(amount)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(wallet) = wallet else {
            tx.rollback().await?;
            return Err(AppError::NotFound(format!("Wallet {} not found", wallet_id)));
        };

        tx.commit().await?;
        Ok(Some(wallet))
    }

    async fn complete_withdrawal(
        &self,
        transaction_id: Uuid,
        receipt: &TransferReceipt,
    ) -> Result<Wallet> {
        let mut tx = self.pool.begin().await?;

        let codes = serde_json::json!({
            "recipient_code": receipt.recipient_code,
            "transfer_code": receipt.transfer_code,
        });

        let settled = sqlx::query(SETTLE_WITHDRAWAL_SQL)
            .bind(transaction_id)
            .bind(codes)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = settled else {
            tx.rollback().await?;
            return Err(AppError::Internal(format!(
                "Withdrawal {} is no longer processing",
                transaction_id
            )));
        };
        let wallet_id: Uuid = row.get("wallet_id");
        let amount: rust_decimal::Decimal = row.get("amount");

        let wallet = sqlx::query_as::<_, Wallet>(DEBIT_WALLET_SQL)
            .bind(wallet_id)
            .bind(amount)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(wallet) = wallet else {
            tx.rollback().await?;
            return Err(AppError::InsufficientBalance);
        };

        tx.commit().await?;
        Ok(wallet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn database_new_returns_error_on_invalid_url() {
        let mut config = crate::config::test_config();
        config.database_url = "not-a-url".to_string();
        let result = Database::new(&config).await;
        assert!(result.is_err());
    }

    #[test]
    fn wallet_select_joins_profiles_for_demo_flag() {
        assert!(WALLET_SELECT.contains("LEFT JOIN profiles"));
        assert!(WALLET_SELECT.contains("is_demo"));
    }

    #[test]
    fn deposit_settlement_only_matches_pending_deposits() {
        // Memastikan replay webhook tidak bisa menyelesaikan deposit dua kali
        assert!(SETTLE_DEPOSIT_SQL.contains("status = 'pending'"));
        assert!(SETTLE_DEPOSIT_SQL.contains("type = 'deposit'"));
        assert!(SETTLE_DEPOSIT_SQL.contains("RETURNING wallet_id, amount"));
        assert!(CREDIT_WALLET_SQL.contains("balance = balance + $2"));
    }

    #[test]
    fn withdrawal_settlement_guards_status_and_balance() {
        assert!(SETTLE_WITHDRAWAL_SQL.contains("status = 'processing'"));
        assert!(SETTLE_WITHDRAWAL_SQL.contains("type = 'withdrawal'"));
        assert!(DEBIT_WALLET_SQL.contains("balance = balance - $2"));
        assert!(DEBIT_WALLET_SQL.contains("AND balance >= $2"));
    }
}
