//! API server entry point.

use std::sync::Arc;

use catalog::{Book, CatalogReader, InMemoryCatalog};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::{InMemoryOrderStore, OrderStore, PostgresOrderStore};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use api::config::Config;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Seeds the in-memory catalog from `CATALOG_PATH` when configured.
fn load_catalog(config: &Config) -> Arc<dyn CatalogReader> {
    match &config.catalog_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .unwrap_or_else(|e| panic!("failed to read catalog file {path}: {e}"));
            let books: Vec<Book> = serde_json::from_str(&raw)
                .unwrap_or_else(|e| panic!("failed to parse catalog file {path}: {e}"));
            tracing::info!(count = books.len(), %path, "seeded catalog");
            Arc::new(InMemoryCatalog::with_books(books))
        }
        None => Arc::new(InMemoryCatalog::new()),
    }
}

async fn serve<S: OrderStore + Clone + 'static>(
    config: Config,
    store: S,
    catalog: Arc<dyn CatalogReader>,
    metrics_handle: PrometheusHandle,
) {
    let state = api::build_state(store, catalog, &config.jwt_secret);
    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}

#[tokio::main]
async fn main() {
    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Load configuration and seed the catalog
    let config = Config::from_env();
    let catalog = load_catalog(&config);

    // 4. Pick the store: Postgres when configured, in-memory otherwise
    match config.database_url.clone() {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(10)
                .connect(&url)
                .await
                .expect("failed to connect to database");
            let store = PostgresOrderStore::new(pool);
            store
                .run_migrations()
                .await
                .expect("failed to run migrations");
            tracing::info!("using PostgreSQL order store");
            serve(config, store, catalog, metrics_handle).await;
        }
        None => {
            tracing::info!("no DATABASE_URL set, using in-memory order store");
            serve(config, InMemoryOrderStore::new(), catalog, metrics_handle).await;
        }
    }
}
