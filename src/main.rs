use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use cinesim::{
    api::{create_router, AppState},
    config::Config,
    services::Recommender,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    // Index construction is CPU-bound and must finish before serving
    let catalog_path = config.catalog_path.clone();
    let recommender =
        tokio::task::spawn_blocking(move || Recommender::from_csv_path(catalog_path)).await??;

    let state = AppState::new(Arc::new(recommender), &config);
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
