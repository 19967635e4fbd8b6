//! Screen engine - the owned state container behind the display surfaces
//!
//! `ScreenEngine` owns the event window, the running counters, the position
//! cache, the effect pool and the filter state, and is the only thing that
//! mutates them. The presentation layer is a pure consumer of its read-only
//! views. All mutation happens on discrete event-loop turns under the
//! runtime's lock, so none of the inner structures need their own locking.
//!
//! ```text
//! RawAction (bulk / live)
//!     ↓
//! StreamIngestor::admit
//!     ↓
//! ScreenEngine::admit()          window + counters + position cache
//!     ↓ (live only)
//! EffectScheduler::spawn_for_event()
//!     ↓
//! visible_items() / counters() / live_effects()   read-only views
//! ```

use super::counters::{CounterAggregator, CounterSnapshot};
use super::effects::{EffectInstance, EffectScheduler};
use super::filter::{
    self, FilterState, KindFilter, PeriodFilter, PeriodWindows, TargetFilter,
};
use super::placement::PlacementAllocator;
use super::store::WindowedEventStore;
use super::types::{Channel, ReactionEvent, VisibleItem};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

/// Counts over the currently filtered view, shown in the screen header.
/// Unlike `CounterSnapshot` these shrink when filters narrow or bubbles age
/// out of the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleBreakdown {
    /// support posts carrying a non-empty message
    pub messages: usize,
    /// qa posts
    pub questions: usize,
    /// emotion reactions
    pub now: usize,
}

pub struct ScreenEngine {
    store: WindowedEventStore,
    counters: CounterAggregator,
    placement: PlacementAllocator<StdRng>,
    effects: EffectScheduler<StdRng>,
    /// Live effect instances by triggering event id, for eviction cancel.
    /// Entries leave with their event, so this is bounded by the window.
    effect_index: HashMap<String, Vec<u64>>,
    filter: FilterState,
    periods: PeriodWindows,
    spatial_capacity: usize,
}

impl ScreenEngine {
    pub fn new(
        window_capacity: usize,
        spatial_capacity: usize,
        max_effects: usize,
        periods: PeriodWindows,
    ) -> Self {
        Self::with_seed(
            window_capacity,
            spatial_capacity,
            max_effects,
            periods,
            rand::random(),
        )
    }

    /// Deterministic construction for tests.
    pub fn with_seed(
        window_capacity: usize,
        spatial_capacity: usize,
        max_effects: usize,
        periods: PeriodWindows,
        seed: u64,
    ) -> Self {
        Self {
            store: WindowedEventStore::new(window_capacity),
            counters: CounterAggregator::new(),
            placement: PlacementAllocator::new(StdRng::seed_from_u64(seed)),
            effects: EffectScheduler::new(max_effects, StdRng::seed_from_u64(seed.wrapping_add(1))),
            effect_index: HashMap::new(),
            filter: FilterState::default(),
            periods,
            spatial_capacity,
        }
    }

    /// Admit a canonical event into the window.
    ///
    /// Assigns the position exactly once, updates counters, and evicts
    /// overflowed items together with their cached positions and any effects
    /// they triggered. `live` events additionally spawn effects anchored at
    /// the new bubble; historical bulk-load events do not. A duplicate id is
    /// a no-op (returns false).
    pub fn admit(&mut self, event: ReactionEvent, live: bool, now_ms: i64) -> bool {
        if self.store.contains(&event.id) {
            return false;
        }

        let position = self.placement.position_for(&event.id);
        self.counters.increment(&event.channel);

        let evicted = self.store.insert(event.clone());
        self.placement.evict(&evicted);
        for id in &evicted {
            if let Some(instances) = self.effect_index.remove(id) {
                self.effects.cancel(&instances);
            }
        }

        if live {
            let spawned = self.effects.spawn_for_event(&event, position, now_ms);
            self.effect_index.insert(event.id, spawned);
        }
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.store.contains(id)
    }

    pub fn window_len(&self) -> usize {
        self.store.len()
    }

    // ── filter state ───────────────────────────────────────────────

    pub fn set_kind_filter(&mut self, kind: KindFilter) {
        self.filter.set_kind(kind);
    }

    pub fn set_target_filter(&mut self, target: TargetFilter) {
        self.filter.set_target(target);
    }

    pub fn set_target_detail(&mut self, detail: Option<String>) {
        self.filter.set_target_detail(detail);
    }

    pub fn set_period_filter(&mut self, period: PeriodFilter) {
        self.filter.set_period(period);
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    // ── read-only views ────────────────────────────────────────────

    /// The spatial view: filtered events from the (smaller) spatial window,
    /// each with its stable cached position. Never reassigns a position.
    pub fn visible_items(&self) -> Vec<VisibleItem> {
        filter::visible(
            self.store.recent(self.spatial_capacity),
            &self.filter,
            &self.periods,
        )
        .into_iter()
        .filter_map(|event| {
            self.placement.get(&event.id).map(|(x, y)| VisibleItem {
                event: event.clone(),
                x,
                y,
                fixed: true,
            })
        })
        .collect()
    }

    /// The list view: the filtered window in arrival order, no positions.
    pub fn filtered_events(&self) -> Vec<ReactionEvent> {
        filter::visible(self.store.all(), &self.filter, &self.periods)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Header counts over the filtered view.
    pub fn visible_breakdown(&self) -> VisibleBreakdown {
        let filtered = filter::visible(self.store.all(), &self.filter, &self.periods);
        VisibleBreakdown {
            messages: filtered
                .iter()
                .filter(|e| e.channel == Channel::Support && e.has_message())
                .count(),
            questions: filtered.iter().filter(|e| e.channel == Channel::Qa).count(),
            now: filtered
                .iter()
                .filter(|e| e.channel == Channel::Emotion)
                .count(),
        }
    }

    /// Running totals since startup, independent of the window.
    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    pub fn live_effects(&self) -> Vec<EffectInstance> {
        self.effects.live().cloned().collect()
    }

    // ── periodic maintenance ───────────────────────────────────────

    /// Sweep expired effect instances. Driven by the runtime's tick.
    pub fn expire_effects(&mut self, now_ms: i64) -> usize {
        self.effects.expire(now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::TargetGroup;
    use chrono::{TimeZone, Utc};

    fn periods() -> PeriodWindows {
        PeriodWindows {
            pre_start: Utc.with_ymd_and_hms(2025, 12, 3, 15, 0, 0).unwrap(),
            day_start: Utc.with_ymd_and_hms(2025, 12, 6, 15, 0, 0).unwrap(),
            day_end: Utc.with_ymd_and_hms(2025, 12, 7, 15, 0, 0).unwrap(),
        }
    }

    fn engine() -> ScreenEngine {
        ScreenEngine::with_seed(10, 5, 200, periods(), 99)
    }

    fn make_event(id: &str, channel: Channel) -> ReactionEvent {
        ReactionEvent {
            id: id.to_string(),
            action_key: "wow".to_string(),
            message: Some("こんにちは".to_string()),
            image_ref: None,
            target_group: TargetGroup::All,
            target_detail_id: None,
            display_name: None,
            created_at: Utc.with_ymd_and_hms(2025, 12, 7, 2, 0, 0).unwrap(),
            is_question: channel == Channel::Qa,
            channel,
        }
    }

    #[test]
    fn test_admit_assigns_position_once() {
        let mut engine = engine();
        engine.admit(make_event("a", Channel::Emotion), false, 0);

        let first = engine.visible_items();
        assert_eq!(first.len(), 1);
        let (x, y) = (first[0].x, first[0].y);
        assert!(first[0].fixed);

        // New arrivals and repeated reads never move an existing bubble
        for i in 0..3 {
            engine.admit(make_event(&format!("b{}", i), Channel::Support), false, 0);
        }
        let again = engine.visible_items();
        let a = again.iter().find(|v| v.event.id == "a").unwrap();
        assert_eq!((a.x, a.y), (x, y));
    }

    #[test]
    fn test_duplicate_admission_is_noop() {
        let mut engine = engine();
        assert!(engine.admit(make_event("a", Channel::Emotion), true, 0));
        let effects_after_first = engine.live_effects().len();

        assert!(!engine.admit(make_event("a", Channel::Emotion), true, 0));
        assert_eq!(engine.window_len(), 1);
        assert_eq!(engine.counters().emotion, 1);
        // No second round of effects either
        assert_eq!(engine.live_effects().len(), effects_after_first);
    }

    #[test]
    fn test_counters_survive_eviction() {
        let mut engine = ScreenEngine::with_seed(3, 3, 50, periods(), 7);
        for i in 0..10 {
            engine.admit(make_event(&format!("e{}", i), Channel::Support), false, 0);
        }
        assert_eq!(engine.window_len(), 3);
        assert_eq!(engine.counters().support, 10);
    }

    #[test]
    fn test_spatial_view_is_smaller_than_list_view() {
        let mut engine = engine(); // window 10, spatial 5
        for i in 0..8 {
            engine.admit(make_event(&format!("e{}", i), Channel::Support), false, 0);
        }
        assert_eq!(engine.filtered_events().len(), 8);
        let items = engine.visible_items();
        assert_eq!(items.len(), 5);
        // The spatial view keeps the newest items
        assert!(items.iter().all(|v| {
            let n: usize = v.event.id[1..].parse().unwrap();
            n >= 3
        }));
    }

    #[test]
    fn test_live_admission_spawns_effects_bulk_does_not() {
        let mut engine = engine();
        engine.admit(make_event("historical", Channel::Emotion), false, 0);
        assert!(engine.live_effects().is_empty());

        engine.admit(make_event("fresh", Channel::Emotion), true, 0);
        assert!(!engine.live_effects().is_empty());

        engine.expire_effects(10_000);
        assert!(engine.live_effects().is_empty());
    }

    #[test]
    fn test_eviction_cancels_the_events_effects() {
        let mut engine = ScreenEngine::with_seed(2, 2, 200, periods(), 17);
        engine.admit(make_event("live", Channel::Emotion), true, 0);
        assert!(!engine.live_effects().is_empty());

        // Push the live event out of the window before its effects expire
        engine.admit(make_event("h1", Channel::Support), false, 0);
        engine.admit(make_event("h2", Channel::Support), false, 0);
        assert!(!engine.contains("live"));
        assert!(engine.live_effects().is_empty());
    }

    #[test]
    fn test_filtering_does_not_touch_positions() {
        let mut engine = engine();
        engine.admit(make_event("a", Channel::Emotion), false, 0);
        engine.admit(make_event("b", Channel::Qa), false, 0);

        let before = engine.visible_items();
        let pos_a = before.iter().find(|v| v.event.id == "a").map(|v| (v.x, v.y));

        engine.set_kind_filter(KindFilter::Qa);
        assert_eq!(engine.visible_items().len(), 1);

        engine.set_kind_filter(KindFilter::All);
        let after = engine.visible_items();
        let pos_a_after = after.iter().find(|v| v.event.id == "a").map(|v| (v.x, v.y));
        assert_eq!(pos_a, pos_a_after);
    }

    #[test]
    fn test_visible_breakdown_counts() {
        let mut engine = engine();
        engine.admit(make_event("s1", Channel::Support), false, 0);
        let mut silent = make_event("s2", Channel::Support);
        silent.message = None;
        engine.admit(silent, false, 0);
        engine.admit(make_event("q1", Channel::Qa), false, 0);
        engine.admit(make_event("n1", Channel::Emotion), false, 0);

        let breakdown = engine.visible_breakdown();
        assert_eq!(breakdown.messages, 1); // only the support post with text
        assert_eq!(breakdown.questions, 1);
        assert_eq!(breakdown.now, 1);
    }
}
