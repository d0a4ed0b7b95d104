//! Circulation Server - lending library inventory and loans
//!
//! Loads configuration, sets up logging, opens the catalog store and serves
//! the REST API.

use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use circulation_server::{
    api,
    config::{AppConfig, StorageBackend},
    repository::{CatalogStore, MemoryCatalogStore, PgCatalogStore},
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("circulation_server={},tower_http=debug", config.logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Circulation Server v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn CatalogStore> = match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .connect(&config.database.url)
                .await?;

            tracing::info!("Connected to database");

            let store = PgCatalogStore::new(pool);
            store.migrate().await?;

            tracing::info!("Database migrations completed");
            Arc::new(store)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory catalog store; data is lost on shutdown");
            Arc::new(MemoryCatalogStore::new())
        }
    };

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(Services::new(store)),
    };

    // Build router
    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
