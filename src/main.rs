use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod constants;
mod db;
mod error;
mod integrations;
mod models;
mod services;
mod utils;

use config::Config;
use constants::API_VERSION;
use db::Database;
use integrations::PaystackClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chessstake_wallet=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting ChessStake wallet backend");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("API Version: {}", API_VERSION);
    if config.is_sandbox() {
        tracing::info!("Paystack running with a test key");
    }

    // Initialize database
    let db = Database::new(&config).await?;

    tracing::info!("Running database migrations...");
    db.run_migrations().await?;

    // Initialize Redis
    let redis = redis::Client::open(config.redis_url.clone())?;
    let redis_manager = redis::aio::ConnectionManager::new(redis).await?;

    let gateway = PaystackClient::new(
        config.paystack_base_url.clone(),
        config.paystack_secret_key.clone(),
    );

    let app_state = api::AppState {
        db: db.clone(),
        ledger: Arc::new(db.clone()),
        gateway: Arc::new(gateway),
        redis: redis_manager,
        config: config.clone(),
    };

    let app = build_router(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: api::AppState) -> Router {
    let cors = cors_from_config(&state.config);

    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Session
        .route("/api/v1/auth/session", get(api::auth::get_session))
        // Wallet
        .route("/api/v1/wallet", get(api::wallet::get_wallet))
        .route("/api/v1/wallet/conversion", get(api::wallet::get_conversion))
        .route("/api/v1/banks", get(api::wallet::list_banks))
        .route(
            "/api/v1/wallet/accounts/resolve",
            get(api::wallet::resolve_account),
        )
        // Deposits & withdrawals
        .route(
            "/api/v1/wallet/deposits",
            post(api::deposit::create_deposit),
        )
        .route(
            "/api/v1/wallet/withdrawals",
            post(api::withdrawal::create_withdrawal),
        )
        // Transactions
        .route(
            "/api/v1/wallet/transactions",
            get(api::transactions::get_history),
        )
        .route(
            "/api/v1/wallet/transactions/export",
            get(api::transactions::export_csv),
        )
        .route(
            "/api/v1/wallet/transactions/{id}",
            get(api::transactions::get_details),
        )
        // Paystack notifications
        .route("/paystack/webhook", post(api::paystack::handle_webhook))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
