use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    constants::{DEFAULT_MIN_DEPOSIT, DEFAULT_MIN_WITHDRAWAL, DEFAULT_NAIRA_TO_COIN, MINOR_UNITS_PER_MAJOR},
    error::{AppError, Result},
};

// ==================== CURRENCY CONVERSION ====================
/// Values of the `currency_conversion` system setting. Amounts are in naira;
/// `naira_to_coin` is how many naira make one ledger coin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConversionSettings {
    pub naira_to_coin: Decimal,
    pub min_deposit: Decimal,
    pub min_withdrawal: Decimal,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            naira_to_coin: Decimal::from(DEFAULT_NAIRA_TO_COIN),
            min_deposit: Decimal::from(DEFAULT_MIN_DEPOSIT),
            min_withdrawal: Decimal::from(DEFAULT_MIN_WITHDRAWAL),
        }
    }
}

fn positive_field(value: &serde_json::Value, key: &str) -> Option<Decimal> {
    let field = value.get(key)?;
    let parsed = match field {
        serde_json::Value::Number(n) => n.to_string().parse::<Decimal>().ok(),
        serde_json::Value::String(s) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    }?;
    (parsed > Decimal::ZERO).then_some(parsed)
}

impl ConversionSettings {
    /// Reads the stored JSON value; every missing or non-positive field falls
    /// back to its default independently.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let defaults = Self::default();
        Self {
            naira_to_coin: positive_field(value, "naira_to_coin").unwrap_or(defaults.naira_to_coin),
            min_deposit: positive_field(value, "min_deposit").unwrap_or(defaults.min_deposit),
            min_withdrawal: positive_field(value, "min_withdrawal")
                .unwrap_or(defaults.min_withdrawal),
        }
    }

    /// Naira amount -> ledger coins.
    pub fn to_ledger_units(&self, amount: Decimal) -> Result<Decimal> {
        amount
            .checked_div(self.naira_to_coin)
            .map(|coins| coins.normalize())
            .ok_or_else(|| AppError::Internal("Invalid conversion rate".to_string()))
    }

    /// Ledger coins -> naira amount.
    pub fn to_currency_units(&self, coins: Decimal) -> Result<Decimal> {
        coins
            .checked_mul(self.naira_to_coin)
            .map(|amount| amount.normalize())
            .ok_or_else(out_of_range)
    }
}

fn out_of_range() -> AppError {
    AppError::BadRequest("Amount is out of range".to_string())
}

/// Naira -> kobo, as expected by the gateway.
pub fn to_minor_units(amount: Decimal) -> Result<i64> {
    use rust_decimal::prelude::ToPrimitive;

    amount
        .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
        .and_then(|kobo| kobo.round().to_i64())
        .ok_or_else(out_of_range)
}
