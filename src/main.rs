use device_api::config::DEFAULT_LOG_FILTER;
use device_api::{
    app_router, apply_migrations, connect_pool, ensure_database_exists, AppConfig, AppState,
    PgDeviceRepository, SystemClock,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = AppConfig::from_env()?;
    if config.database_auto_create {
        ensure_database_exists(&config.database_url).await?;
    }
    let pool = connect_pool(&config).await?;
    apply_migrations(&pool).await?;

    let state = AppState::new(
        Arc::new(PgDeviceRepository::new(pool.clone())),
        Arc::new(SystemClock),
    );
    let app = app_router(state, config.request_body_limit);

    let listener = TcpListener::bind(config.listen_addr()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    pool.close().await;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
