//! Screen runtime configuration from environment variables

use crate::engine::filter::PeriodWindows;
use chrono::{DateTime, Utc};
use std::env;

/// Configuration for the screen runtime
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct ScreenConfig {
    /// Base URL of the event backend REST endpoint
    pub backend_url: String,

    /// Optional API key for the backend
    pub backend_api_key: Option<String>,

    /// Path to the SQLite file holding per-client last-submit timestamps
    pub submit_log_path: String,

    /// Event window capacity (textual/list views)
    pub window_capacity: usize,

    /// Read-side truncation for the spatial bubble view
    pub spatial_capacity: usize,

    /// Hard limit for the initial bulk fetch
    pub fetch_limit: usize,

    /// Maximum concurrently live effect instances
    pub max_effects: usize,

    /// Effect expiry sweep interval in milliseconds
    pub effect_sweep_ms: u64,

    /// Bounded wait for identity resolution in milliseconds
    pub name_resolve_timeout_ms: u64,

    /// Live-event channel buffer size
    pub channel_buffer: usize,

    /// Start of the pre-event period (event-local instant)
    pub period_pre_start: DateTime<Utc>,

    /// Start of the event day
    pub period_day_start: DateTime<Utc>,

    /// End of the event day (exclusive)
    pub period_day_end: DateTime<Utc>,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_instant(key: &str, default: &str) -> DateTime<Utc> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            DateTime::parse_from_rfc3339(default)
                .expect("default period boundary is valid RFC 3339")
                .with_timezone(&Utc)
        })
}

impl ScreenConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `CROWDFLOW_BACKEND_URL` (default: http://localhost:54321/rest/v1)
    /// - `CROWDFLOW_BACKEND_API_KEY` (optional)
    /// - `CROWDFLOW_SUBMIT_LOG_PATH` (default: /var/lib/crowdflow/submit_log.db)
    /// - `EVENT_WINDOW_CAPACITY` (default: 200)
    /// - `SPATIAL_VIEW_CAPACITY` (default: 120)
    /// - `BULK_FETCH_LIMIT` (default: 200)
    /// - `MAX_EFFECT_INSTANCES` (default: 120)
    /// - `EFFECT_SWEEP_INTERVAL_MS` (default: 250)
    /// - `NAME_RESOLVE_TIMEOUT_MS` (default: 1500)
    /// - `EVENT_CHANNEL_BUFFER` (default: 1024)
    /// - `PERIOD_PRE_START` / `PERIOD_DAY_START` / `PERIOD_DAY_END`
    ///   (RFC 3339; defaults are the 2025 event days in JST)
    pub fn from_env() -> Self {
        Self {
            backend_url: env::var("CROWDFLOW_BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:54321/rest/v1".to_string()),

            backend_api_key: env::var("CROWDFLOW_BACKEND_API_KEY").ok(),

            submit_log_path: env::var("CROWDFLOW_SUBMIT_LOG_PATH")
                .unwrap_or_else(|_| "/var/lib/crowdflow/submit_log.db".to_string()),

            window_capacity: env_parse("EVENT_WINDOW_CAPACITY", 200),
            spatial_capacity: env_parse("SPATIAL_VIEW_CAPACITY", 120),
            fetch_limit: env_parse("BULK_FETCH_LIMIT", 200),
            max_effects: env_parse("MAX_EFFECT_INSTANCES", 120),
            effect_sweep_ms: env_parse("EFFECT_SWEEP_INTERVAL_MS", 250),
            name_resolve_timeout_ms: env_parse("NAME_RESOLVE_TIMEOUT_MS", 1_500),
            channel_buffer: env_parse("EVENT_CHANNEL_BUFFER", 1_024),

            period_pre_start: env_instant("PERIOD_PRE_START", "2025-12-04T00:00:00+09:00"),
            period_day_start: env_instant("PERIOD_DAY_START", "2025-12-07T00:00:00+09:00"),
            period_day_end: env_instant("PERIOD_DAY_END", "2025-12-08T00:00:00+09:00"),
        }
    }

    pub fn period_windows(&self) -> PeriodWindows {
        PeriodWindows {
            pre_start: self.period_pre_start,
            day_start: self.period_day_start,
            day_end: self.period_day_end,
        }
    }
}
