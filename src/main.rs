use chart_proxy::config::Config;
use chart_proxy::error::Result;
use chart_proxy::handlers::{create_router, AppState};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    let state = Arc::new(AppState::new(&config));
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    info!("Starting chart proxy on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
