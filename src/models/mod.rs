// src/models/mod.rs
pub mod response;
pub mod session;
pub mod settings;
pub mod wallet;

pub use response::{ApiResponse, PaginatedResponse};
pub use session::Session;
pub use settings::{to_minor_units, ConversionSettings};
pub use wallet::{
    HistoryFilter,
    NewTransaction,
    PayoutDetails,
    StatusBadge,
    Transaction,
    TransactionStatus,
    TransactionType,
    TransferReceipt,
    Wallet,
};
