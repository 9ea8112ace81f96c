use anyhow::Context;
use axum::{routing::get, Router};
use ingestor::{config::Config, db::Store, metrics, rest};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;

    info!("Starting sensor ingestor");
    info!("HTTP server: {}", config.http_addr);
    info!("Database: {}", config.database_url);

    metrics::init_metrics().context("failed to register metrics")?;

    let store = match Store::connect(
        &config.database_url,
        config.db_max_connections,
        config.db_busy_timeout,
    )
    .await
    {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to initialize storage: {}", e);
            std::process::exit(1);
        }
    };

    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .merge(rest::create_router(store.clone()));

    let listener = tokio::net::TcpListener::bind(&config.http_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.http_addr))?;

    info!("HTTP server listening on {}", config.http_addr);
    info!("POST /api/data   - add a sensor reading");
    info!("GET  /api/latest - latest reading");
    info!("GET  /api/data   - recent history");

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap_or_else(|e| {
            error!("HTTP server error: {}", e);
        });
    });

    tokio::select! {
        _ = server_handle => {
            error!("HTTP server terminated");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    store.close().await;
    info!("Shutting down");
    Ok(())
}

async fn metrics_handler() -> String {
    metrics::gather_metrics()
}
