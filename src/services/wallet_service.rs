use std::sync::Arc;

use crate::{
    constants::CONVERSION_SETTINGS_KEY,
    db::LedgerStore,
    error::Result,
    models::{ConversionSettings, Session, Wallet},
};

/// Wallet lookup with lazy creation, plus the effective conversion settings.
pub struct WalletService {
    ledger: Arc<dyn LedgerStore>,
}

impl WalletService {
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self { ledger }
    }

    pub async fn get_or_create(&self, session: &Session) -> Result<Wallet> {
        if let Some(wallet) = self.ledger.find_wallet_by_user(session.user_id).await? {
            return Ok(wallet);
        }

        tracing::info!("Creating new wallet for user {}", session.user_id);
        self.ledger.create_wallet(session.user_id).await
    }

    /// Never fails: a missing or unreadable setting falls back to defaults.
    pub async fn conversion_settings(&self) -> ConversionSettings {
        match self.ledger.load_setting(CONVERSION_SETTINGS_KEY).await {
            Ok(Some(value)) => ConversionSettings::from_value(&value),
            Ok(None) => {
                tracing::warn!("{} not configured; using defaults", CONVERSION_SETTINGS_KEY);
                ConversionSettings::default()
            }
            Err(e) => {
                tracing::warn!("Error fetching conversion rate, using defaults: {}", e);
                ConversionSettings::default()
            }
        }
    }
}
