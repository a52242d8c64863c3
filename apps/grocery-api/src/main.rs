//! # Grocery API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Grocery API Server                               │
//! │                                                                         │
//! │  Till (browser) ───► HTTP (5000) ───► Routes ───► SQLite (WAL)          │
//! │                                          │                              │
//! │                                          ▼                              │
//! │                                    BillSequencer                        │
//! │                                  (YYMM-NNNNNN ids)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Configuration comes from `GROCERY_*` environment variables (see
//! [`grocery_api::config`]); log filtering from `RUST_LOG`.

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use grocery_api::config::ApiConfig;
use grocery_api::state::AppState;
use grocery_api::{app, shutdown_signal};
use grocery_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("grocery_api=info,grocery_db=info,tower_http=info")
        }))
        .with_target(true)
        .init();

    info!("Starting Grocery API server...");

    // Load configuration
    let config = ApiConfig::load()?;
    info!(
        addr = %config.socket_addr(),
        db = %config.database_path.display(),
        bill_number_date = %config.bill_number_date,
        "Configuration loaded"
    );

    // Open database (runs migrations)
    let db = Database::new(
        DbConfig::new(config.database_path.clone()).max_connections(config.max_connections),
    )
    .await?;

    let addr = config.socket_addr();
    let state = AppState::new(db.clone(), config);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Server listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}
