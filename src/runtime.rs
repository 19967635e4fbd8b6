//! Screen runtime - async channel processor for live reaction events
//!
//! Main loop:
//! 1. Receives raw actions from the delivery channel
//! 2. Admits each through `StreamIngestor` (cutoff, identity, effects)
//! 3. Periodically sweeps expired effect instances
//!
//! Effect expiry is driven ONLY by this loop's timer: no per-instance
//! timers, one sweep per tick under a single lock acquisition.

use crate::backend::EventBackend;
use crate::config::ScreenConfig;
use crate::engine::ingest::StreamIngestor;
use crate::engine::screen::ScreenEngine;
use crate::engine::types::RawAction;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Start the screen ingestion loop
///
/// Runs until the delivery channel closes. Arguments:
/// - `rx`: receiver end of the raw action channel
/// - `engine`: shared screen state (Arc<Mutex<>>)
/// - `backend`: event backend for cutoff / identity lookups
/// - `config`: runtime tunables (sweep interval, fetch limit, timeouts)
pub async fn start_screen_ingestion(
    mut rx: mpsc::Receiver<RawAction>,
    engine: Arc<Mutex<ScreenEngine>>,
    backend: Arc<dyn EventBackend>,
    config: &ScreenConfig,
) {
    log::info!("🚀 Starting screen ingestion");
    log::info!("   ├─ Effect sweep interval: {}ms", config.effect_sweep_ms);
    log::info!("   └─ Waiting for events...");

    let ingestor = StreamIngestor::new(
        backend,
        engine.clone(),
        config.fetch_limit,
        Duration::from_millis(config.name_resolve_timeout_ms),
    );

    let mut sweep_timer = interval(Duration::from_millis(config.effect_sweep_ms));
    let channel_capacity = config.channel_buffer;
    let mut event_count = 0u64;
    let mut last_log_time = std::time::Instant::now();

    loop {
        tokio::select! {
            Some(raw) = rx.recv() => {
                let id = raw.id.clone();
                if ingestor.admit_live(raw, now_ms()).await {
                    event_count += 1;
                } else {
                    log::debug!("⏭️  Event {} not admitted", id);
                }

                // Log throughput every 10 seconds
                if last_log_time.elapsed().as_secs() >= 10 {
                    let per_sec = event_count as f64 / last_log_time.elapsed().as_secs_f64();
                    log::info!("📊 Ingestion rate: {:.1} events/sec (total: {})", per_sec, event_count);
                    last_log_time = std::time::Instant::now();
                    event_count = 0;
                }
            }

            // Periodic effect expiry - ONLY sweep mechanism
            _ = sweep_timer.tick() => {
                let (expired, live, window_len) = {
                    let mut engine_guard = engine.lock().unwrap();
                    let expired = engine_guard.expire_effects(now_ms());
                    (expired, engine_guard.live_effects().len(), engine_guard.window_len())
                };

                if expired > 0 {
                    log::debug!("🧹 Swept {} expired effects ({} live, window: {})",
                        expired, live, window_len);
                }

                // Warn if the channel is filling up (> 50% capacity)
                let channel_usage = rx.len();
                if channel_usage > channel_capacity / 2 {
                    log::warn!("⚠️  Channel usage high: {}/{} ({}%)",
                        channel_usage, channel_capacity,
                        (channel_usage * 100) / channel_capacity.max(1));
                }
            }

            // Channel closed (delivery shutdown)
            else => {
                log::warn!("⚠️  Event channel closed, stopping ingestion");

                // Final sweep so the pool does not hold stale instances
                let expired = engine.lock().unwrap().expire_effects(now_ms());
                if expired > 0 {
                    log::info!("🧹 Final sweep: {} effects cleared", expired);
                }
                break;
            }
        }
    }

    log::info!("✅ Screen ingestion stopped");
}
