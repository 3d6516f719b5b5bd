use redis::AsyncCommands;
use std::sync::Arc;

use crate::{
    constants::BANK_CACHE_KEY,
    integrations::{Bank, PaymentGateway},
};

fn encode_banks(banks: &[Bank]) -> Option<String> {
    serde_json::to_string(banks).ok()
}

fn decode_banks(raw: &str) -> Option<Vec<Bank>> {
    serde_json::from_str::<Vec<Bank>>(raw)
        .ok()
        .filter(|banks| !banks.is_empty())
}

/// Supported banks, cached in Redis. Any failure degrades to an empty list.
pub struct BankDirectory {
    gateway: Arc<dyn PaymentGateway>,
    redis: Option<redis::aio::ConnectionManager>,
    ttl_secs: u64,
}

impl BankDirectory {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        redis: Option<redis::aio::ConnectionManager>,
        ttl_secs: u64,
    ) -> Self {
        Self {
            gateway,
            redis,
            ttl_secs,
        }
    }

    pub async fn list(&self) -> Vec<Bank> {
        if let Some(banks) = self.cached().await {
            return banks;
        }

        match self.gateway.list_banks().await {
            Ok(banks) => {
                tracing::debug!("Fetched {} banks from gateway", banks.len());
                self.store(&banks).await;
                banks
            }
            Err(e) => {
                tracing::error!("Error fetching banks: {}", e);
                Vec::new()
            }
        }
    }

    async fn cached(&self) -> Option<Vec<Bank>> {
        let mut conn = self.redis.clone()?;
        match conn.get::<_, Option<String>>(BANK_CACHE_KEY).await {
            Ok(raw) => raw.as_deref().and_then(decode_banks),
            Err(err) => {
                tracing::warn!("Bank cache read skipped: {}", err);
                None
            }
        }
    }

    async fn store(&self, banks: &[Bank]) {
        let (Some(mut conn), Some(payload)) = (self.redis.clone(), encode_banks(banks)) else {
            return;
        };
        if banks.is_empty() {
            return;
        }
        let result: std::result::Result<(), redis::RedisError> =
            conn.set_ex(BANK_CACHE_KEY, payload, self.ttl_secs).await;
        if let Err(err) = result {
            tracing::warn!("Bank cache write failed: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::ScriptedGateway;

    #[tokio::test]
    async fn without_cache_reads_gateway_every_time() {
        let gateway = Arc::new(ScriptedGateway::ok());
        let directory = BankDirectory::new(gateway.clone(), None, 60);

        let banks = directory.list().await;
        directory.list().await;

        assert_eq!(banks.len(), 1);
        assert_eq!(banks[0].code, "058");
        assert_eq!(gateway.calls().len(), 2);
    }

    #[test]
    fn cache_payload_roundtrip_rejects_empty() {
        // Memastikan cache kosong dianggap miss
        let banks = vec![Bank {
            name: "Access Bank".into(),
            code: "044".into(),
        }];
        let raw = encode_banks(&banks).unwrap();
        assert_eq!(decode_banks(&raw).unwrap()[0].name, "Access Bank");
        assert!(decode_banks("[]").is_none());
        assert!(decode_banks("not json").is_none());
    }
}
