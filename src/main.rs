//! Study sessions API server.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use study_sessions::adapters::http::{app_router, AuthState, HealthState};
use study_sessions::adapters::postgres::{create_pool, run_migrations};
use study_sessions::adapters::{KeycloakConfig, KeycloakSessionValidator, PostgresSessionStore};
use study_sessions::application::SessionLifecycle;
use study_sessions::config::AppConfig;
use study_sessions::ports::SessionStore;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config);

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "invalid configuration");
        return Err(e.into());
    }

    let pool = create_pool(&config.database).await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        "database connection pool created"
    );

    if config.database.run_migrations {
        run_migrations(&pool).await?;
        tracing::info!("database migrations applied");
    }

    let store: Arc<dyn SessionStore> = Arc::new(PostgresSessionStore::new(pool.clone()));
    let validator: AuthState =
        Arc::new(KeycloakSessionValidator::new(KeycloakConfig::from(&config.auth))?);

    let app = app_router(
        SessionLifecycle::new(store.clone()),
        validator,
        HealthState::new(store),
        &config.server,
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("graceful shutdown complete");
    Ok(())
}

/// JSON lines in production, human-readable output elsewhere. `RUST_LOG`
/// overrides the configured filter.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl-C handler");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl-C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
