/// Application constants

// API version
pub const API_VERSION: &str = "v1";

// Conversion fallbacks, used when `system_settings.currency_conversion` is unavailable
pub const CONVERSION_SETTINGS_KEY: &str = "currency_conversion";
pub const DEFAULT_NAIRA_TO_COIN: i64 = 1000;
pub const DEFAULT_MIN_DEPOSIT: i64 = 1000;
pub const DEFAULT_MIN_WITHDRAWAL: i64 = 1000;

// Paystack
pub const PAYSTACK_DEFAULT_BASE_URL: &str = "https://api.paystack.co";
pub const PAYSTACK_SIGNATURE_HEADER: &str = "x-paystack-signature";
pub const PAYSTACK_CURRENCY: &str = "NGN";
pub const PAYSTACK_RECIPIENT_TYPE: &str = "nuban";
pub const PAYSTACK_TRANSFER_SOURCE: &str = "balance";
pub const TRANSFER_REASON: &str = "Withdrawal from ChessStake";
pub const MINOR_UNITS_PER_MAJOR: i64 = 100; // kobo per naira
pub const MAX_AMOUNT_DECIMALS: u32 = 2;
pub const MAX_TRANSACTION_AMOUNT: i64 = 100_000_000; // naira
pub const TRANSFER_STATUS_FAILED: &str = "failed";
pub const TRANSFER_STATUS_OTP: &str = "otp";

// Webhook events
pub const EVENT_CHARGE_SUCCESS: &str = "charge.success";
pub const CHARGE_STATUS_SUCCESS: &str = "success";

// References
pub const DEPOSIT_REFERENCE_PREFIX: &str = "chess";
pub const WITHDRAWAL_REFERENCE_PREFIX: &str = "chess_wd";
pub const REFERENCE_RANDOM_RANGE: u32 = 1_000_000;

// Bank accounts
pub const ACCOUNT_NUMBER_LENGTH: usize = 10;

// Bank directory cache
pub const BANK_CACHE_KEY: &str = "paystack:banks:ngn";
pub const DEFAULT_BANK_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

// Auth
pub const DEFAULT_JWT_AUDIENCE: &str = "authenticated";

// Pagination
pub const DEFAULT_PAGE_LIMIT: i32 = 20;
pub const DEFAULT_MAX_PAGE_LIMIT: u32 = 100;
pub const EXPORT_ROW_LIMIT: i32 = 10_000;
