//! # mockpay
//!
//! Mock payment gateway backend for the MPR demo storefront.
//!
//! ## Usage
//!
//! ```bash
//! # Optional configuration
//! export MOCKPAY_HOST=0.0.0.0
//! export MOCKPAY_PORT=8000
//! export MOCKPAY_DATA_DIR=data
//!
//! # Run the server
//! mockpay
//! ```

use mockpay_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Initialize application state (creates the data directories)
    let state = AppState::new()?;

    let addr = state.config.socket_addr();
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Data directory: {}", state.config.data_dir.display());
    info!(
        "Session TTL: {} minutes",
        state.gateway.policy().session_ttl_minutes
    );

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("🚀 mockpay gateway starting on http://{}", addr);

    if !is_prod {
        info!("📊 Health check: http://{}/health", addr);
        info!(
            "💳 Payment API: POST http://{}/api/create-mock-payment-session",
            addr
        );
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
