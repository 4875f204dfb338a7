use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use valentine_backend::config::ServerConfig;
use valentine_backend::{create_router, initialize_backend};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let app_state = initialize_backend(&config).await?;
    let app = create_router(app_state);

    info!("Starting server on {} (public URL {})", config.bind_addr, config.public_url);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
