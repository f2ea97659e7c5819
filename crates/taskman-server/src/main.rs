use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use taskman_core::{InMemoryStore, PasswordHasher, TokenService, seed_defaults, seed_demo};
use taskman_db::{Backend, Database, DatabaseConfig};
use taskman_server::config::ServerConfig;
use taskman_server::routes;
use taskman_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("taskman=info".parse()?))
        .with_target(false)
        .init();

    let config = ServerConfig::from_env()?;
    let _sentry = init_sentry(&config)?;

    let store = match DatabaseConfig::from_env_optional()? {
        Some(db_config) => {
            let db = Database::connect(&db_config).await?;
            db.migrate().await?;
            Backend::Postgres(db)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, data is kept in memory and lost on exit");
            Backend::Memory(InMemoryStore::new())
        }
    };

    let hasher = PasswordHasher::new();
    let tokens = TokenService::new(config.jwt_secret.as_bytes(), config.token_ttl)?;

    seed_defaults(&store, &hasher, &config.admin).await?;
    if config.demo_data {
        seed_demo(&store, &hasher).await?;
    }

    let state = Arc::new(AppState::new(store, tokens, hasher));

    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Start error reporting when `SENTRY_DSN` is configured.
///
/// The returned guard flushes pending events on drop.
fn init_sentry(config: &ServerConfig) -> anyhow::Result<Option<sentry::ClientInitGuard>> {
    let Some(raw) = config.sentry_dsn.as_deref() else {
        return Ok(None);
    };

    let dsn: sentry::types::Dsn = raw.parse().context("Invalid SENTRY_DSN")?;
    let guard = sentry::init(sentry::ClientOptions {
        dsn: Some(dsn),
        release: sentry::release_name!(),
        environment: Some(config.sentry_environment.clone().into()),
        ..Default::default()
    });

    tracing::info!(environment = %config.sentry_environment, "Sentry error reporting enabled");
    Ok(Some(guard))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
