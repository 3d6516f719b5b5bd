// Utility helpers

use rust_decimal::Decimal;

use crate::{
    constants::{
        ACCOUNT_NUMBER_LENGTH, MAX_AMOUNT_DECIMALS, MAX_TRANSACTION_AMOUNT,
        REFERENCE_RANDOM_RANGE,
    },
    error::{AppError, Result},
};

/// Basic guard for list/query limits to avoid expensive queries.
pub fn ensure_page_limit(limit: i32, configured_max: u32) -> Result<()> {
    let max = configured_max.max(1);

    if limit < 1 {
        return Err(AppError::BadRequest("limit must be at least 1".to_string()));
    }
    if limit as u32 > max {
        return Err(AppError::RateLimitExceeded);
    }

    Ok(())
}

/// `<prefix>_<unix millis>_<random>`; unique per attempt in practice, the
/// unique index on `transactions.reference` catches the rare collision.
pub fn generate_reference(prefix: &str) -> String {
    format!(
        "{}_{}_{}",
        prefix,
        chrono::Utc::now().timestamp_millis(),
        rand::random_range(0..REFERENCE_RANDOM_RANGE)
    )
}

/// NUBAN account numbers are exactly ten digits.
pub fn validate_account_number(account_number: &str) -> Result<()> {
    let trimmed = account_number.trim();
    if trimmed.len() != ACCOUNT_NUMBER_LENGTH || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest(format!(
            "Account number must be {} digits",
            ACCOUNT_NUMBER_LENGTH
        )));
    }
    Ok(())
}

/// Naira amounts must be whole kobo and below the per-transaction ceiling.
pub fn validate_naira_amount(amount: Decimal) -> Result<()> {
    if amount > Decimal::from(MAX_TRANSACTION_AMOUNT) {
        return Err(AppError::BadRequest("Amount is out of range".to_string()));
    }
    if amount.normalize().scale() > MAX_AMOUNT_DECIMALS {
        return Err(AppError::BadRequest(format!(
            "Amount can have at most {} decimal places",
            MAX_AMOUNT_DECIMALS
        )));
    }
    Ok(())
}

pub fn validate_bank_code(bank_code: &str) -> Result<()> {
    if bank_code.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Please enter your account number and select a bank".to_string(),
        ));
    }
    Ok(())
}
