use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use plotwist_providers::my_anime_list::{AnimeLookup, MalClient};
use plotwist_providers::tmdb::{MetadataProvider, TmdbClient};
use plotwist_worker::config::ImportConfig;
use plotwist_worker::consumer::ImportConsumer;
use plotwist_worker::queue::{ImportQueue, PgImportQueue};
use plotwist_worker::runner;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let fmt_layer = if std::env::var("LOG_FORMAT").is_ok_and(|v| v == "json") {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plotwist_worker=debug".into()),
        )
        .with(fmt_layer)
        .init();

    // --- Configuration ---
    let config = ImportConfig::from_env();
    tracing::info!(
        movies = config.enable_movies,
        series = config.enable_series,
        "Loaded import configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = plotwist_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    plotwist_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database connection pool created");

    // --- Providers ---
    let metadata: Arc<dyn MetadataProvider> =
        Arc::new(TmdbClient::new(std::env::var("TMDB_ACCESS_TOKEN").ok()));
    let anime: Arc<dyn AnimeLookup> = Arc::new(MalClient::new(std::env::var("MAL_CLIENT_ID").ok()));
    let queue: Arc<dyn ImportQueue> = Arc::new(PgImportQueue::new(pool.clone()));

    // --- Consumers ---
    let cancel = CancellationToken::new();
    let mut consumers = Vec::new();
    if config.enable_movies {
        consumers.push(ImportConsumer::movies(pool.clone(), Arc::clone(&metadata), Arc::clone(&anime)));
    }
    if config.enable_series {
        consumers.push(ImportConsumer::series(pool.clone(), Arc::clone(&metadata), Arc::clone(&anime)));
    }
    if consumers.is_empty() {
        tracing::warn!("No import consumer enabled, set ENABLE_IMPORT_MOVIES or ENABLE_IMPORT_SERIES");
    }

    let handles: Vec<_> = consumers
        .into_iter()
        .map(|consumer| {
            tokio::spawn(runner::run(
                Arc::clone(&queue),
                consumer,
                config.poll_interval,
                cancel.clone(),
            ))
        })
        .collect();

    shutdown_signal().await;

    cancel.cancel();
    for handle in handles {
        let _ = tokio::time::timeout(Duration::from_secs(10), handle).await;
    }
    tracing::info!("Worker stopped");
    Ok(())
}

/// Wait for SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT (Ctrl-C), shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
