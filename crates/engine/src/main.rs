//! SheetWright Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sheetwright_engine::api;
use sheetwright_engine::infrastructure::{
    clock::SystemClock,
    config::{load_dotenv_from_repo_root, EngineConfig, StoreKind},
    memory_repo::InMemoryCharacterRepo,
    ports::{CharacterRepo, ClockPort},
    sqlite_repo::SqliteCharacterRepo,
};
use sheetwright_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine may run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetwright_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SheetWright Engine");

    let config = EngineConfig::from_env();
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

    let character_repo: Arc<dyn CharacterRepo> = match config.store {
        StoreKind::Memory => {
            tracing::info!("Using in-memory character store");
            Arc::new(InMemoryCharacterRepo::new())
        }
        StoreKind::Sqlite => {
            tracing::info!(path = %config.db_path, "Using SQLite character store");
            Arc::new(SqliteCharacterRepo::new(&config.db_path).await?)
        }
    };

    let app = Arc::new(App::new(character_repo, clock));

    let mut router = api::http::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = api::cors::build_cors_layer(config.cors_allowed_origins.as_deref()) {
        router = router.layer(cors);
    }

    // Start server
    let addr: SocketAddr = config.bind_address().parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
