mod config;
mod db;
mod events;
mod ordering;
mod routes;
mod services;
mod shutdown;
mod state;

use config::{Config, ConfigError};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("database init failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("server io error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info,sqlx=warn")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "trellolite failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = Config::from_env()?;

    let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;
    let state = state::AppState::from_config(pool, &config);
    let shutdown = state.shutdown.clone();

    let app = routes::app(state, config.cors_allow_any);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;

    tracing::info!(
        port = config.port,
        heartbeat_secs = config.stream_heartbeat.as_secs(),
        stream_buffer = config.stream_buffer,
        "trellolite listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::cancel_on(shutdown, shutdown::shutdown_signal()))
        .await?;

    tracing::info!("trellolite stopped");
    Ok(())
}
