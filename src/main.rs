use anyhow::Context;
use api_rest::{router, AppState};
use medicard_core::constants::DEFAULT_DATABASE_URL;
use medicard_core::{CoreConfig, Database};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the MEDICARD backend
///
/// Resolves configuration from the environment, opens the store, applies pending migrations
/// and serves the REST API until interrupted.
///
/// # Environment Variables
/// - `DATABASE_URL`: store location (default: "sqlite://medicard.db")
/// - `MEDICARD_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `JWT_SECRET_KEY`: token signing secret (required)
/// - `JWT_ACCESS_TOKEN_EXPIRES`: token lifetime in seconds (default: 86400)
/// - `MEDICARD_INDICATOR_WINDOW_HOURS`: dashboard indicator window (default: 48)
///
/// # Errors
/// Returns an error if configuration is invalid, the store cannot be opened or migrated, the
/// address cannot be bound, or the server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medicard=info,api_rest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Arc::new(CoreConfig::from_env_values(
        std::env::var("JWT_SECRET_KEY").ok(),
        std::env::var("JWT_ACCESS_TOKEN_EXPIRES").ok(),
        std::env::var("MEDICARD_INDICATOR_WINDOW_HOURS").ok(),
    )?);
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into());
    let rest_addr = std::env::var("MEDICARD_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let db = Database::connect(&database_url)
        .await
        .with_context(|| format!("opening store at {database_url}"))?;
    db.run_migrations().await.context("applying migrations")?;

    tracing::info!("++ Starting MEDICARD REST on {}", rest_addr);
    tracing::debug!("config: {:?}", cfg);

    let app = router(AppState::new(db, cfg));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- MEDICARD REST stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
