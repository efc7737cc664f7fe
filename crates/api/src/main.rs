use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use compliance_api::app::{create_app, AppState};
use compliance_api::config::Config;
use compliance_api::middleware;
use compliance_api::storage::LocalStorage;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    middleware::logging::init_logging(&config.logging)
        .context("Failed to initialize logging")?;
    middleware::init_metrics().context("Failed to install Prometheus recorder")?;

    info!("Starting Compliance Checkpoint API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&config.database.pool_config()).await?;

    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    let evidence_store = LocalStorage::new(&config.storage.evidence_dir)
        .await
        .context("Failed to open evidence storage")?;
    let export_store = LocalStorage::new(&config.storage.export_dir)
        .await
        .context("Failed to open export storage")?;

    let addr = config.socket_addr()?;
    let state = AppState::new(
        config,
        pool,
        Arc::new(evidence_store),
        Arc::new(export_store),
    )?;
    let app: Router = create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
