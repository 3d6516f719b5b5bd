use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

// ==================== WALLET ====================
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: Decimal,
    pub is_demo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==================== TRANSACTION ====================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
        }
    }

    /// Sign shown in front of the amount in history views.
    pub fn sign(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "+",
            TransactionType::Withdrawal => "-",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
    Warning,
    Info,
    Success,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: &'static str,
    pub tone: BadgeTone,
    pub icon: &'static str,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Processing => "processing",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Completed | TransactionStatus::Failed)
    }

    /// Allowed moves: pending -> completed (deposit webhook) and
    /// processing -> completed | failed (withdrawal transfer response).
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        matches!(
            (self, next),
            (TransactionStatus::Pending, TransactionStatus::Completed)
                | (TransactionStatus::Processing, TransactionStatus::Completed)
                | (TransactionStatus::Processing, TransactionStatus::Failed)
        )
    }

    pub fn badge(&self) -> StatusBadge {
        match self {
            TransactionStatus::Pending => StatusBadge {
                label: "Pending",
                tone: BadgeTone::Warning,
                icon: "clock",
            },
            TransactionStatus::Processing => StatusBadge {
                label: "Processing",
                tone: BadgeTone::Info,
                icon: "loader",
            },
            TransactionStatus::Completed => StatusBadge {
                label: "Completed",
                tone: BadgeTone::Success,
                icon: "check-circle",
            },
            TransactionStatus::Failed => StatusBadge {
                label: "Failed",
                tone: BadgeTone::Danger,
                icon: "alert-circle",
            },
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutDetails {
    pub account_number: String,
    pub bank_code: String,
    pub account_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub wallet_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub reference: String,
    pub payout_details: Option<Json<PayoutDetails>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub wallet_id: Uuid,
    pub tx_type: TransactionType,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub reference: String,
    pub payout_details: Option<PayoutDetails>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryFilter {
    pub tx_type: Option<TransactionType>,
    pub status: Option<TransactionStatus>,
}

impl HistoryFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.tx_type.is_none_or(|t| t == tx.tx_type) && self.status.is_none_or(|s| s == tx.status)
    }
}

/// Transfer codes returned by the gateway once a withdrawal is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub recipient_code: String,
    pub transfer_code: String,
}
