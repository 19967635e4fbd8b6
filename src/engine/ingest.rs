//! Stream ingestion - normalizing backend deliveries into the engine
//!
//! Two admission paths share one set of rules: the startup bulk load and the
//! live append stream. Both apply the display-time cutoff and the
//! `frogs`→`pitch` normalization before anything reaches the window; the
//! live path additionally resolves missing display names against the
//! identity collaborator under a bounded wait.
//!
//! Failure posture: the screen must never hard-fail during a live event. A
//! failed bulk fetch leaves the window empty and is logged once; an
//! ambiguous cutoff lookup on the live path admits the event rather than
//! silently dropping it (a handful of stale bubbles beats losing fresh
//! ones).

use super::screen::ScreenEngine;
use super::types::RawAction;
use crate::backend::EventBackend;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::timeout;

pub struct StreamIngestor {
    backend: Arc<dyn EventBackend>,
    engine: Arc<Mutex<ScreenEngine>>,
    fetch_limit: usize,
    name_resolve_timeout: Duration,
}

impl StreamIngestor {
    pub fn new(
        backend: Arc<dyn EventBackend>,
        engine: Arc<Mutex<ScreenEngine>>,
        fetch_limit: usize,
        name_resolve_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            engine,
            fetch_limit,
            name_resolve_timeout,
        }
    }

    /// Startup load: everything at or after the display cutoff, oldest
    /// first, up to the fetch limit. Historical events spawn no effects.
    ///
    /// Returns the number of admitted events. On fetch failure the window
    /// stays empty; the failure is logged here and not retried.
    pub async fn bulk_load(&self, now_ms: i64) -> usize {
        let cutoff = match self.backend.fetch_display_cutoff().await {
            Ok(cutoff) => cutoff,
            Err(e) => {
                log::warn!("⚠️  Display cutoff lookup failed, loading without cutoff: {}", e);
                None
            }
        };

        let rows = match self.backend.fetch_recent(cutoff, self.fetch_limit).await {
            Ok(rows) => rows,
            Err(e) => {
                log::warn!("⚠️  Initial bulk fetch failed, starting with empty window: {}", e);
                return 0;
            }
        };

        // Backend returns newest-first; the window wants arrival order
        let mut engine = self.engine.lock().unwrap();
        let mut admitted = 0;
        for raw in rows.into_iter().rev() {
            if engine.admit(raw.into_event(), false, now_ms) {
                admitted += 1;
            }
        }
        log::info!("✅ Bulk load complete: {} events in window", admitted);
        admitted
    }

    /// Admit one live append. Returns true if the event entered the window.
    pub async fn admit_live(&self, mut raw: RawAction, now_ms: i64) -> bool {
        // Re-check the cutoff per delivery; the config value can change
        // mid-event. An error here admits conservatively.
        match self.backend.fetch_display_cutoff().await {
            Ok(Some(cutoff)) if raw.created_at < cutoff => {
                log::debug!("⏭️  Skipping pre-cutoff event {} ({})", raw.id, raw.created_at);
                return false;
            }
            Ok(_) => {}
            Err(e) => {
                log::debug!("⚠️  Cutoff lookup failed, admitting {}: {}", raw.id, e);
            }
        }

        if raw.display_name.is_none() {
            if let Some(client_key) = raw.client_key.clone() {
                raw.display_name = self.resolve_name(&client_key).await;
            }
        }

        // The id check lives inside admit(), under the lock: a resolve that
        // raced a duplicate delivery of the same event ends as a no-op here.
        self.engine
            .lock()
            .unwrap()
            .admit(raw.into_event(), true, now_ms)
    }

    /// Bounded identity lookup. Never blocks ingestion: timeout or failure
    /// falls back to an anonymous bubble.
    async fn resolve_name(&self, client_key: &str) -> Option<String> {
        match timeout(
            self.name_resolve_timeout,
            self.backend.resolve_display_name(client_key),
        )
        .await
        {
            Ok(Ok(name)) => name,
            Ok(Err(e)) => {
                log::debug!("⚠️  Display name lookup failed for {}: {}", client_key, e);
                None
            }
            Err(_) => {
                log::debug!("⚠️  Display name lookup timed out for {}", client_key);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NewAction;
    use crate::engine::filter::PeriodWindows;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn periods() -> PeriodWindows {
        PeriodWindows {
            pre_start: Utc.with_ymd_and_hms(2025, 12, 3, 15, 0, 0).unwrap(),
            day_start: Utc.with_ymd_and_hms(2025, 12, 6, 15, 0, 0).unwrap(),
            day_end: Utc.with_ymd_and_hms(2025, 12, 7, 15, 0, 0).unwrap(),
        }
    }

    fn engine() -> Arc<Mutex<ScreenEngine>> {
        Arc::new(Mutex::new(ScreenEngine::with_seed(50, 50, 200, periods(), 5)))
    }

    fn raw(id: &str, ts: DateTime<Utc>) -> RawAction {
        RawAction {
            id: id.to_string(),
            channel: "emotion".to_string(),
            action_key: Some("wow".to_string()),
            message: None,
            image_url: None,
            target_group: Some("all".to_string()),
            to_pitch_id: None,
            display_name: None,
            client_key: Some("client-1".to_string()),
            created_at: ts,
            is_question: false,
        }
    }

    /// Scriptable backend double.
    struct FakeBackend {
        cutoff: Result<Option<DateTime<Utc>>, String>,
        rows: Result<Vec<RawAction>, String>,
        display_name: Option<String>,
        resolve_calls: AtomicUsize,
    }

    impl FakeBackend {
        fn ok(cutoff: Option<DateTime<Utc>>, rows: Vec<RawAction>) -> Self {
            Self {
                cutoff: Ok(cutoff),
                rows: Ok(rows),
                display_name: None,
                resolve_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EventBackend for FakeBackend {
        async fn fetch_display_cutoff(
            &self,
        ) -> Result<Option<DateTime<Utc>>, Box<dyn std::error::Error + Send + Sync>> {
            self.cutoff.clone().map_err(|e| e.into())
        }

        async fn fetch_recent(
            &self,
            _cutoff: Option<DateTime<Utc>>,
            limit: usize,
        ) -> Result<Vec<RawAction>, Box<dyn std::error::Error + Send + Sync>> {
            self.rows
                .clone()
                .map(|rows| rows.into_iter().take(limit).collect())
                .map_err(|e| e.into())
        }

        async fn resolve_display_name(
            &self,
            _client_key: &str,
        ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
            self.resolve_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.display_name.clone())
        }

        async fn insert_action(
            &self,
            _action: NewAction,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            Ok(())
        }
    }

    fn ingestor(backend: FakeBackend, engine: Arc<Mutex<ScreenEngine>>) -> StreamIngestor {
        StreamIngestor::new(
            Arc::new(backend),
            engine,
            200,
            Duration::from_millis(200),
        )
    }

    fn day_ts(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 7, h, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_bulk_load_reverses_to_arrival_order() {
        let engine = engine();
        // Backend delivers newest-first
        let backend = FakeBackend::ok(
            None,
            vec![raw("newest", day_ts(3)), raw("middle", day_ts(2)), raw("oldest", day_ts(1))],
        );
        let ingestor = ingestor(backend, engine.clone());

        assert_eq!(ingestor.bulk_load(0).await, 3);

        let events = engine.lock().unwrap().filtered_events();
        let ids: Vec<String> = events.iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec!["oldest", "middle", "newest"]);
        // Historical load spawns no effects
        assert!(engine.lock().unwrap().live_effects().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_load_failure_leaves_window_empty() {
        let engine = engine();
        let backend = FakeBackend {
            cutoff: Ok(None),
            rows: Err("connection refused".to_string()),
            display_name: None,
            resolve_calls: AtomicUsize::new(0),
        };
        let ingestor = ingestor(backend, engine.clone());

        assert_eq!(ingestor.bulk_load(0).await, 0);
        assert_eq!(engine.lock().unwrap().window_len(), 0);
    }

    #[tokio::test]
    async fn test_live_event_before_cutoff_is_skipped() {
        let engine = engine();
        let backend = FakeBackend::ok(Some(day_ts(2)), vec![]);
        let ingestor = ingestor(backend, engine.clone());

        assert!(!ingestor.admit_live(raw("early", day_ts(1)), 0).await);
        assert!(ingestor.admit_live(raw("late", day_ts(3)), 0).await);
        assert_eq!(engine.lock().unwrap().window_len(), 1);
    }

    #[tokio::test]
    async fn test_cutoff_lookup_failure_admits_conservatively() {
        let engine = engine();
        let backend = FakeBackend {
            cutoff: Err("config table unavailable".to_string()),
            rows: Ok(vec![]),
            display_name: None,
            resolve_calls: AtomicUsize::new(0),
        };
        let ingestor = ingestor(backend, engine.clone());

        // Ambiguous cutoff resolution: admit rather than drop
        assert!(ingestor.admit_live(raw("a", day_ts(1)), 0).await);
    }

    #[tokio::test]
    async fn test_missing_display_name_is_resolved() {
        let engine = engine();
        let backend = FakeBackend {
            cutoff: Ok(None),
            rows: Ok(vec![]),
            display_name: Some("ほし".to_string()),
            resolve_calls: AtomicUsize::new(0),
        };
        let ingestor = ingestor(backend, engine.clone());

        ingestor.admit_live(raw("a", day_ts(1)), 0).await;

        let events = engine.lock().unwrap().filtered_events();
        assert_eq!(events[0].display_name.as_deref(), Some("ほし"));
    }

    #[tokio::test]
    async fn test_present_display_name_skips_resolution() {
        let engine = engine();
        let backend = FakeBackend::ok(None, vec![]);
        let backend = Arc::new(backend);
        let ingestor = StreamIngestor::new(
            backend.clone(),
            engine,
            200,
            Duration::from_millis(200),
        );

        let mut r = raw("a", day_ts(1));
        r.display_name = Some("すでにある".to_string());
        ingestor.admit_live(r, 0).await;

        assert_eq!(backend.resolve_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_duplicate_live_delivery_is_idempotent() {
        let engine = engine();
        let backend = FakeBackend::ok(None, vec![]);
        let ingestor = ingestor(backend, engine.clone());

        assert!(ingestor.admit_live(raw("a", day_ts(1)), 0).await);
        assert!(!ingestor.admit_live(raw("a", day_ts(1)), 0).await);
        assert_eq!(engine.lock().unwrap().window_len(), 1);
        assert_eq!(engine.lock().unwrap().counters().emotion, 1);
    }
}
