use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use dataforecast_datafast::DatafastClient;
use dataforecast_server::state::AppState;

/// `dataforecast health`: liveness probe for Docker HEALTHCHECK.
///
/// Calls `GET http://localhost:$DATAFORECAST_PORT/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("DATAFORECAST_PORT").unwrap_or_else(|_| "3000".to_string());
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }
    // Structured JSON logging. Level controlled via RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dataforecast=info".parse()?),
        )
        .json()
        .init();

    let cfg = dataforecast_core::config::Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    if cfg.default_api_key.is_none() {
        warn!("DATAFAST_API_KEY not set. Requests without a datafast-api-key cookie will show no data.");
    }

    let client = DatafastClient::new(&cfg.api_base, cfg.cache_ttl())?;
    let state = Arc::new(AppState::new(Arc::new(client), cfg.clone())?);

    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = dataforecast_server::app::build_app(state);

    info!(
        port = cfg.port,
        timezone = %cfg.timezone,
        cache_ttl_seconds = cfg.cache_ttl_seconds,
        "DataForecast listening on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
