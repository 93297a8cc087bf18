use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use roster_api::config::{AppConfig, StoreBackend};
use roster_api::database::memory::MemoryStore;
use roster_api::database::postgres::PgUserStore;
use roster_api::database::{Database, UserStore};
use roster_api::handlers::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    tracing::info!("Starting Roster API in {:?} mode", config.environment);

    // Open the store once at startup and inject it; closed again below.
    let mut database = None;
    let store: Arc<dyn UserStore> = match config.database.backend {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; data will not survive restart");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Postgres => {
            let db = Database::connect(&config.database).await?;
            db.migrate().await?;
            let store = Arc::new(PgUserStore::new(db.pool().clone()));
            database = Some(db);
            store
        }
    };

    let state = AppState::new(store, config.server.request_timeout());
    let app = router(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Roster API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = database {
        db.close().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
