use serde::Deserialize;
use std::env;

use crate::constants::{
    DEFAULT_BANK_CACHE_TTL_SECS, DEFAULT_JWT_AUDIENCE, DEFAULT_MAX_PAGE_LIMIT,
    PAYSTACK_DEFAULT_BASE_URL,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Redis
    pub redis_url: String,
    pub bank_cache_ttl_secs: u64,

    // Auth (tokens are issued by the BaaS, we only verify them)
    pub jwt_secret: String,
    pub jwt_audience: String,

    // Paystack
    pub paystack_secret_key: String,
    pub paystack_base_url: String,
    pub paystack_callback_url: Option<String>,

    // Pagination
    pub max_page_limit: u32,

    // CORS
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            database_url: env::var("DATABASE_URL")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()?,

            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            bank_cache_ttl_secs: env::var("BANK_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_BANK_CACHE_TTL_SECS),

            jwt_secret: env::var("JWT_SECRET")?,
            jwt_audience: env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| DEFAULT_JWT_AUDIENCE.to_string()),

            paystack_secret_key: env::var("PAYSTACK_SECRET_KEY")?,
            paystack_base_url: env::var("PAYSTACK_BASE_URL")
                .unwrap_or_else(|_| PAYSTACK_DEFAULT_BASE_URL.to_string()),
            paystack_callback_url: env::var("PAYSTACK_CALLBACK_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),

            max_page_limit: env::var("MAX_PAGE_LIMIT")
                .unwrap_or_else(|_| DEFAULT_MAX_PAGE_LIMIT.to_string())
                .parse()?,

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL is empty");
        }
        if self.jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET is empty");
        }
        if self.paystack_secret_key.trim().is_empty() {
            anyhow::bail!("PAYSTACK_SECRET_KEY is empty");
        }
        if url::Url::parse(&self.paystack_base_url).is_err() {
            anyhow::bail!("PAYSTACK_BASE_URL is not a valid URL");
        }
        if let Some(callback) = &self.paystack_callback_url {
            if url::Url::parse(callback).is_err() {
                anyhow::bail!("PAYSTACK_CALLBACK_URL is not a valid URL");
            }
        }

        if self.paystack_secret_key.starts_with("sk_test_") && !self.is_sandbox() {
            tracing::warn!("Paystack test key configured outside a sandbox environment");
        }
        if self.paystack_secret_key.starts_with("sk_live_") && self.is_sandbox() {
            tracing::warn!("Paystack live key configured in {}", self.environment);
        }

        if self.max_page_limit == 0 {
            tracing::warn!("MAX_PAGE_LIMIT should be > 0");
        }

        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn is_sandbox(&self) -> bool {
        self.environment == "development" || self.environment == "staging"
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        host: "0.0.0.0".to_string(),
        port: 3000,
        environment: "development".to_string(),
        database_url: "postgres://localhost/chessstake".to_string(),
        database_max_connections: 1,
        redis_url: "redis://localhost:6379".to_string(),
        bank_cache_ttl_secs: 60,
        jwt_secret: "test_secret".to_string(),
        jwt_audience: "authenticated".to_string(),
        paystack_secret_key: "sk_test_dummy".to_string(),
        paystack_base_url: "https://api.paystack.co".to_string(),
        paystack_callback_url: None,
        max_page_limit: 50,
        cors_allowed_origins: "*".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_test_config() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_paystack_key() {
        // Memastikan secret key Paystack wajib diisi
        let mut config = test_config();
        config.paystack_secret_key = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_invalid_callback_url() {
        let mut config = test_config();
        config.paystack_callback_url = Some("not a url".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn sandbox_detection_follows_environment() {
        let mut config = test_config();
        assert!(config.is_sandbox());
        config.environment = "production".to_string();
        assert!(!config.is_sandbox());
    }
}
