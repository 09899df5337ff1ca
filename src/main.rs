use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use page_summarizer::{
    config::Config,
    api::routes::create_router,
    scraper::HttpSource,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::load()?;
    let server_addr = config.server_addr;
    info!(
        method = config.pipeline.method.as_str(),
        extract = config.pipeline.extract.strategy.as_str(),
        "starting server on {}",
        server_addr
    );

    // Create application state
    let app_state = AppState {
        config: Arc::new(config),
        source: Arc::new(HttpSource),
    };

    let app = create_router(app_state);
    let listener = TcpListener::bind(server_addr).await?;

    info!("listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
