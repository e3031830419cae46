mod api;
mod config;
mod ml;
mod movies;
mod render;
mod reviews;
mod tmdb;

#[cfg(test)]
mod test_support;

use anyhow::Context;
use dotenv::dotenv;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::tmdb::TmdbClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;
    if config.tmdb_api_key.is_empty() {
        warn!("TMDB_API_KEY is not set; upstream calls will be rejected");
    }

    // Built once and shared read-only by every request.
    let classifier = ml::build_classifier(&config);
    let catalog = Arc::new(TmdbClient::new(&config));
    let bind_addr = config.bind_addr;

    let state = Arc::new(api::AppState {
        config,
        catalog,
        classifier,
    });
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
