//! Screen Runtime - venue display wiring
//!
//! This binary orchestrates the screen side of the system:
//! - Loads configuration from the environment
//! - Connects the HTTP event backend
//! - Bulk-loads the recent event window (no effects for history)
//! - Runs the live ingestion loop until shutdown
//!
//! Usage:
//!   cargo run --release --bin screen_runtime
//!
//! Environment variables:
//!   CROWDFLOW_BACKEND_URL - REST endpoint base (default: http://localhost:54321/rest/v1)
//!   CROWDFLOW_BACKEND_API_KEY - optional bearer token
//!   EVENT_WINDOW_CAPACITY - list window size (default: 200)
//!   SPATIAL_VIEW_CAPACITY - bubble view truncation (default: 120)
//!   EFFECT_SWEEP_INTERVAL_MS - effect expiry tick (default: 250)

use crowdflow::backend::HttpEventBackend;
use crowdflow::config::ScreenConfig;
use crowdflow::engine::ingest::StreamIngestor;
use crowdflow::engine::screen::ScreenEngine;
use crowdflow::engine::types::RawAction;
use crowdflow::runtime::start_screen_ingestion;
use dotenv::dotenv;
use log::{error, info};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();

    // Logs go to stderr so a display process can own stdout
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    info!("🚀 Starting screen runtime...");

    let config = ScreenConfig::from_env();
    info!("📊 Configuration:");
    info!("   ├─ Backend: {}", config.backend_url);
    info!("   ├─ Window capacity: {}", config.window_capacity);
    info!("   ├─ Spatial capacity: {}", config.spatial_capacity);
    info!("   ├─ Effect pool: {} instances", config.max_effects);
    info!("   └─ Sweep interval: {}ms", config.effect_sweep_ms);

    let backend = Arc::new(HttpEventBackend::new(
        &config.backend_url,
        config.backend_api_key.as_deref(),
    )?);

    let engine = Arc::new(Mutex::new(ScreenEngine::new(
        config.window_capacity,
        config.spatial_capacity,
        config.max_effects,
        config.period_windows(),
    )));
    info!("✅ Screen engine created");

    // Seed the window with recent history before going live
    let ingestor = StreamIngestor::new(
        backend.clone(),
        engine.clone(),
        config.fetch_limit,
        Duration::from_millis(config.name_resolve_timeout_ms),
    );
    let loaded = ingestor
        .bulk_load(chrono::Utc::now().timestamp_millis())
        .await;
    info!("✅ Bulk load: {} events in window", loaded);

    // Live event channel; the delivery side holds the sender
    let (tx, rx) = mpsc::channel::<RawAction>(config.channel_buffer);
    info!("✅ Event channel created (buffer: {})", config.channel_buffer);

    let engine_ingestion = engine.clone();
    let backend_ingestion = backend.clone();
    let loop_config = config.clone();
    let ingestion_handle = tokio::spawn(async move {
        start_screen_ingestion(rx, engine_ingestion, backend_ingestion, &loop_config).await;
    });
    info!("✅ Ingestion loop running");
    info!("🔄 Press CTRL+C to shutdown gracefully");

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("⚠️  Received CTRL+C, shutting down..."),
        Err(err) => error!("❌ Failed to listen for CTRL+C: {}", err),
    }

    // Closing the channel lets the loop drain and stop
    drop(tx);
    let _ = tokio::time::timeout(Duration::from_secs(2), ingestion_handle).await;

    info!("✅ Screen runtime stopped");
    Ok(())
}
