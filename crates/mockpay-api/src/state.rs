//! # Application State
//!
//! Shared state for the axum application: the payment session gateway
//! wired to its file stores, plus server configuration from the
//! environment.

use mockpay_core::{CheckoutPolicy, PaymentSessions, SystemClock};
use mockpay_store::{FileOrderStore, FileSessionStore, JsonStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Root directory for the session and order collections
    pub data_dir: PathBuf,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables (`MOCKPAY_` prefix)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("MOCKPAY_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("MOCKPAY_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            data_dir: std::env::var("MOCKPAY_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            environment: std::env::var("MOCKPAY_ENV")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address")
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The payment session gateway
    pub gateway: Arc<PaymentSessions>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create an AppState with file-backed stores under the data dir
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let policy = load_checkout_policy();

        let sessions: FileSessionStore = JsonStore::open(config.data_dir.join("sessions"))?;
        let orders: FileOrderStore = JsonStore::open(config.data_dir.join("orders"))?;

        let gateway = PaymentSessions::new(
            Arc::new(sessions),
            Arc::new(orders),
            policy,
            Arc::new(SystemClock),
        );

        Ok(Self {
            gateway: Arc::new(gateway),
            config,
        })
    }
}

/// Load checkout policy from config file, falling back to the defaults
fn load_checkout_policy() -> CheckoutPolicy {
    let config_paths = [
        "config/gateway.toml",
        "../config/gateway.toml",
        "../../config/gateway.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            match CheckoutPolicy::from_toml(&content) {
                Ok(policy) => {
                    tracing::info!("Loaded checkout policy from {}", path);
                    return policy;
                }
                Err(e) => {
                    tracing::warn!("Ignoring malformed {}: {}", path, e);
                }
            }
        }
    }

    tracing::info!("No policy config found, using defaults");
    CheckoutPolicy::default()
}
