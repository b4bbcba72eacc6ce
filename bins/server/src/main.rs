//! Money Book API Server
//!
//! Main entry point for the money book backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moneybook_api::{AppState, create_router};
use moneybook_core::ledger::{EntryStore, InMemoryEntryStore};
use moneybook_db::{
    LedgerEntryRepository, connect,
    migration::{Migrator, MigratorTrait},
};
use moneybook_shared::{AppConfig, JwtConfig, JwtService, StoreBackend, config::ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moneybook=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let jwt_service = Arc::new(JwtService::new(JwtConfig::from(&config.jwt)));

    match config.store.backend {
        StoreBackend::Postgres => {
            anyhow::ensure!(
                !config.database.url.is_empty(),
                "database.url must be set when store.backend is \"postgres\""
            );

            let db = connect(&config.database).await?;
            info!("Connected to database");

            if config.database.run_migrations {
                Migrator::up(&db, None).await?;
                info!("Pending migrations applied");
            }

            let store = Arc::new(LedgerEntryRepository::new(db));
            serve(&config.server, store, jwt_service).await
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory entry store; entries are lost on restart");
            serve(&config.server, Arc::new(InMemoryEntryStore::new()), jwt_service).await
        }
    }
}

async fn serve<S: EntryStore + 'static>(
    config: &ServerConfig,
    store: Arc<S>,
    jwt_service: Arc<JwtService>,
) -> anyhow::Result<()> {
    let app = create_router(AppState::new(store, jwt_service));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
