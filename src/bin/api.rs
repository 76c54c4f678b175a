//! Timebound API Server
//!
//! Run with: cargo run --bin timebound-api
//!
//! # Configuration
//!
//! Loaded from `TIMEBOUND_CONFIG` when set, otherwise from the default
//! locations. Environment variables override file settings:
//! - `TIMEBOUND_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `TIMEBOUND_API_PORT`: Port to listen on (default: 8090)
//! - `TIMEBOUND_TIMEZONE`: Default timezone (default: UTC)
//! - `TIMEBOUND_TIMESTAMP_STYLE`: plain, ansi or iso8601 (default: plain)
//! - `TIMEBOUND_STRICT_EPOCH_UNITS`: Block degraded filters (default: false)
//! - `RUST_LOG`: Log filter (default: timebound=info)

use std::path::PathBuf;

use timebound::api::{serve, AppState};
use timebound::config::Config;
use timebound::logging::init_logging;
use timebound::processor::QueryProcessor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::var("TIMEBOUND_CONFIG") {
        Ok(path) => Config::load_with_env(&PathBuf::from(path))?,
        Err(_) => Config::load_default(),
    };

    init_logging(&config.logging);

    tracing::info!("Starting Timebound API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        timezone = %config.processor.default_timezone,
        timestamp_style = %config.processor.timestamp_style,
        strict_epoch_units = config.processor.strict_epoch_units,
        "Processor configured"
    );

    let processor = QueryProcessor::new(config.processor.clone());
    let state = AppState::new(processor, config.api.clone());

    tracing::info!("Starting server on {}", config.api.addr());
    serve(state, &config.api).await?;

    tracing::info!("Timebound API server stopped");
    Ok(())
}
