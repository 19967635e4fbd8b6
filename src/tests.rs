#[cfg(test)]
mod tests {
    use crate::backend::submit_log::MemorySubmitLog;
    use crate::engine::filter::{KindFilter, PeriodWindows};
    use crate::engine::gate::{GateDecision, SubmissionGate};
    use crate::engine::screen::ScreenEngine;
    use crate::engine::types::{Channel, RawAction};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn periods() -> PeriodWindows {
        PeriodWindows {
            pre_start: Utc.with_ymd_and_hms(2025, 12, 3, 15, 0, 0).unwrap(),
            day_start: Utc.with_ymd_and_hms(2025, 12, 6, 15, 0, 0).unwrap(),
            day_end: Utc.with_ymd_and_hms(2025, 12, 7, 15, 0, 0).unwrap(),
        }
    }

    fn raw_emotion(id: &str) -> RawAction {
        RawAction {
            id: id.to_string(),
            channel: "emotion".to_string(),
            action_key: Some("wow".to_string()),
            message: None,
            image_url: None,
            target_group: Some("all".to_string()),
            to_pitch_id: None,
            display_name: Some("audience".to_string()),
            client_key: Some("client-1".to_string()),
            created_at: Utc.with_ymd_and_hms(2025, 12, 7, 2, 0, 0).unwrap(),
            is_question: false,
        }
    }

    /// End-to-end path for a single live emotion event: it becomes visible
    /// through the spatial view under matching filters, stays hidden under
    /// non-matching ones, and its burst effect expires on schedule.
    #[test]
    fn test_live_emotion_event_full_path() {
        let mut engine = ScreenEngine::with_seed(200, 120, 120, periods(), 21);
        let event = raw_emotion("e2e-1").into_event();
        assert_eq!(event.channel, Channel::Emotion);

        assert!(engine.admit(event, true, 1_000));

        // Visible under kind=all and kind=emotion
        let items = engine.visible_items();
        assert_eq!(items.len(), 1);
        let (x, y) = (items[0].x, items[0].y);

        engine.set_kind_filter(KindFilter::Emotion);
        assert_eq!(engine.visible_items().len(), 1);

        // Absent under kind=qa; position untouched when the filter widens
        engine.set_kind_filter(KindFilter::Qa);
        assert!(engine.visible_items().is_empty());
        engine.set_kind_filter(KindFilter::All);
        let again = engine.visible_items();
        assert_eq!((again[0].x, again[0].y), (x, y));

        // Burst stars radiate from the bubble, all gone within the longest TTL
        let effects = engine.live_effects();
        assert!(!effects.is_empty());
        for e in &effects {
            if let crate::engine::effects::EffectKind::BurstStar { .. } = e.kind {
                assert!((e.x - x).abs() <= 10.0 && (e.y - y).abs() <= 10.0);
            }
        }

        engine.expire_effects(1_000 + 2_000);
        assert!(engine.live_effects().is_empty());
    }

    /// Submission gating and the window are independent: a rate-limited
    /// second tap never reaches the backend, so the window grows by one.
    #[test]
    fn test_rapid_double_tap_admits_once() {
        let gate = SubmissionGate::new(Arc::new(MemorySubmitLog::new()));
        let mut engine = ScreenEngine::with_seed(200, 120, 120, periods(), 22);

        let first = gate
            .accept("client-1", &Channel::Emotion, None, 10_000)
            .unwrap();
        assert_eq!(first, GateDecision::Allowed);
        engine.admit(raw_emotion("tap-1").into_event(), true, 10_000);

        // 200ms later: rejected, nothing inserted
        let second = gate
            .accept("client-1", &Channel::Emotion, None, 10_200)
            .unwrap();
        assert!(matches!(second, GateDecision::Rejected(_)));

        assert_eq!(engine.window_len(), 1);
        assert_eq!(engine.counters().emotion, 1);

        // A different client is not affected by the first one's timestamps
        let other = gate
            .accept("client-2", &Channel::Emotion, None, 10_200)
            .unwrap();
        assert_eq!(other, GateDecision::Allowed);
    }

    /// Overflow keeps the screen consistent: window and spatial view stay
    /// bounded, counters keep counting, positions exist for every shown item.
    #[test]
    fn test_sustained_stream_stays_bounded() {
        let mut engine = ScreenEngine::with_seed(50, 30, 80, periods(), 23);

        for i in 0..500 {
            engine.admit(raw_emotion(&format!("flood-{}", i)).into_event(), false, 0);
        }

        assert_eq!(engine.window_len(), 50);
        assert_eq!(engine.counters().emotion, 500);

        let items = engine.visible_items();
        assert_eq!(items.len(), 30);
        for item in &items {
            assert!((5.0..=95.0).contains(&item.x));
            assert!((10.0..=90.0).contains(&item.y));
        }
    }
}
