// Disbursement Visualizer - Web Server
// Builds the dashboard once at startup, then serves it read-only

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use disbursement_viz::server::router;
use disbursement_viz::{load_csv, Config, Dashboard};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_args(std::env::args());

    // Load + precompute everything before binding
    let dataset = load_csv(&config.csv_path)
        .with_context(|| format!("Failed to load {}", config.csv_path.display()))?;
    let dashboard = Dashboard::build(&dataset, &config)?;

    let app = router(Arc::new(dashboard));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("🚀 Dashboard running on http://{}", config.bind_addr);
    info!("   API: http://{}/api/figures/map", config.bind_addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
