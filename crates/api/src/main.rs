//! Iqrah adaptive practice server.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iqrah_backend_api::generator::UnconfiguredGenerator;
use iqrah_backend_api::{AppState, build_router};
use iqrah_backend_config::AppConfig;
use iqrah_backend_engine::{
    CoordinatorConfig, Engine, EngineConfig, QuestionGenerator, StaticCurriculumCatalog,
    spawn_coordinator,
};
use iqrah_backend_storage::{InventoryRepository, check_connection, create_pool, run_migrations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Iqrah adaptive practice server...");

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!("Binding to {}", config.bind_address);

    // Create database pool
    let pool = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    // Run migrations
    run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    // Check connectivity before serving traffic
    check_connection(&pool).await?;

    let store: Arc<dyn iqrah_backend_engine::InventoryStore> = Arc::new(InventoryRepository::new(pool.clone()));

    // §6: the curriculum catalog is an external collaborator; a real
    // deployment wires a catalog service here. A static, empty catalog
    // means `fetch_batch` requires an explicit topic until one is wired in.
    let catalog: Arc<dyn iqrah_backend_engine::CurriculumCatalog> = Arc::new(StaticCurriculumCatalog::new());

    // §6: MOCK_GENERATOR selects the deterministic test double; otherwise
    // the seam is unconfigured until a real provider is wired in (§1's
    // "concrete LLM provider" is explicitly out of scope here).
    let generator: Arc<dyn QuestionGenerator> = if config.mock_generator {
        tracing::warn!("MOCK_GENERATOR=true: using the deterministic synthetic question generator");
        Arc::new(iqrah_backend_engine::testing::MockGenerator::new())
    } else {
        Arc::new(UnconfiguredGenerator)
    };

    let cancellation = CancellationToken::new();
    let coordinator_config = CoordinatorConfig {
        workers: config.gen_workers,
        max_attempts: config.gen_max_attempts,
        backoff_base_ms: config.gen_backoff_base_ms,
        backoff_jitter_fraction: config.gen_backoff_jitter_fraction,
        deadline_ms: config.gen_deadline_ms,
        ..CoordinatorConfig::default()
    };
    let coordinator = spawn_coordinator(store.clone(), generator, coordinator_config, cancellation.clone());

    let engine_config = EngineConfig { min_stock: config.min_stock, sync_wait_ms: config.sync_wait_ms };
    let engine = Engine::new(store, catalog, coordinator, engine_config);

    let state = Arc::new(AppState { engine, pool, config: config.clone(), start_time: Instant::now() });

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!("Server listening on {}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancellation))
        .await?;

    Ok(())
}

/// Waits for Ctrl+C (or SIGTERM on unix) and cancels the Generation
/// Coordinator's worker pool (§4.8 cancellation: "workers receive a
/// cancellation signal; in-flight Generator calls are aborted at the next
/// safe point; pending jobs are discarded").
async fn shutdown_signal(cancellation: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, cancelling generation coordinator");
    cancellation.cancel();
}
