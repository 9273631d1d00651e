use anyhow::Result;
use api::{config::AppConfig, routes, state::AppState};
use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting API service");

    let config = AppConfig::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::new(config.database_url.clone())
        .with_max_connections(config.database_max_connections);
    let pool = init_pool(&db_config).await?;
    run_migrations(&pool).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    tokio::fs::create_dir_all(&config.assets_root).await?;

    let addr = format!("0.0.0.0:{}", config.port);
    let state = AppState::from_config(config, pool).await;
    let app = routes::create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("API service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
