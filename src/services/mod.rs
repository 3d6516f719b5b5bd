// Wallet services
pub mod account_verifier;
pub mod bank_directory;
pub mod deposit_service;
pub mod transaction_history;
pub mod wallet_service;
pub mod webhook_service;
pub mod withdrawal_service;

#[cfg(test)]
pub mod test_support;

// Re-export for convenience
pub use account_verifier::{AccountVerifier, VerifiedAccount};
pub use bank_directory::BankDirectory;
pub use deposit_service::{DepositInfo, DepositService};
pub use transaction_history::{TransactionHistoryService, TransactionView};
pub use wallet_service::WalletService;
pub use webhook_service::{WebhookOutcome, WebhookService};
pub use withdrawal_service::{WithdrawalOutcome, WithdrawalRequest, WithdrawalService};
