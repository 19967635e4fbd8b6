//! Composite three-axis filtering over the event window
//!
//! `visible()` is a pure derivation: events in, events out, recomputed on
//! demand whenever the window or the filter state changes. It never mutates
//! the store and never touches assigned positions. The three axes compose by
//! logical AND and are evaluated in short-circuit order: kind, then target,
//! then period.

use super::types::{Channel, ReactionEvent, TargetGroup};
use chrono::{DateTime, Utc};

/// Kind axis: which channel family to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindFilter {
    #[default]
    All,
    /// emotion-channel reactions
    Emotion,
    /// support-channel posts (shown as "messages" on screen)
    Message,
    Qa,
}

/// Target axis: coarse recipient group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetFilter {
    #[default]
    All,
    Venue,
    Talk,
    Pitch,
}

impl TargetFilter {
    fn matches(self, group: TargetGroup) -> bool {
        match self {
            TargetFilter::All => true,
            TargetFilter::Venue => group == TargetGroup::Venue,
            TargetFilter::Talk => group == TargetGroup::Talk,
            TargetFilter::Pitch => group == TargetGroup::Pitch,
        }
    }
}

/// Period axis: event-local calendar slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodFilter {
    #[default]
    All,
    /// The pre-event days, `[pre_start, day_start)`
    Pre,
    /// The event day itself, `[day_start, day_end)`
    Day,
}

/// Fixed calendar instants bounding the pre-event and event-day windows.
///
/// These are event-local wall-clock boundaries converted to UTC once at
/// config time; comparisons here are plain instant comparisons.
#[derive(Debug, Clone, Copy)]
pub struct PeriodWindows {
    pub pre_start: DateTime<Utc>,
    pub day_start: DateTime<Utc>,
    pub day_end: DateTime<Utc>,
}

impl PeriodWindows {
    fn matches(&self, period: PeriodFilter, t: DateTime<Utc>) -> bool {
        match period {
            PeriodFilter::All => true,
            PeriodFilter::Pre => t >= self.pre_start && t < self.day_start,
            PeriodFilter::Day => t >= self.day_start && t < self.day_end,
        }
    }
}

/// The three independent selectors, plus the optional second-level
/// sub-selector scoped to the chosen target.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    pub kind: KindFilter,
    pub target: TargetFilter,
    /// Sub-target within `target` (e.g. one pitch entrant). None means "all".
    pub target_detail: Option<String>,
    pub period: PeriodFilter,
}

impl FilterState {
    pub fn set_kind(&mut self, kind: KindFilter) {
        self.kind = kind;
    }

    /// Changing the target resets the sub-selector: a detail id only means
    /// anything within the group it was chosen under.
    pub fn set_target(&mut self, target: TargetFilter) {
        if self.target != target {
            self.target_detail = None;
        }
        self.target = target;
    }

    pub fn set_target_detail(&mut self, detail: Option<String>) {
        self.target_detail = detail.filter(|d| !d.is_empty() && d != "all");
    }

    pub fn set_period(&mut self, period: PeriodFilter) {
        self.period = period;
    }
}

/// Single-axis kind predicate.
pub fn kind_matches(kind: KindFilter, event: &ReactionEvent) -> bool {
    match kind {
        KindFilter::All => true,
        KindFilter::Emotion => event.channel == Channel::Emotion,
        KindFilter::Message => event.channel == Channel::Support,
        KindFilter::Qa => event.channel == Channel::Qa,
    }
}

/// Single-axis target predicate, including the sub-selector.
pub fn target_matches(
    target: TargetFilter,
    detail: Option<&str>,
    event: &ReactionEvent,
) -> bool {
    if !target.matches(event.target_group) {
        return false;
    }
    match detail {
        Some(d) => event.target_detail_id.as_deref() == Some(d),
        None => true,
    }
}

/// Single-axis period predicate.
pub fn period_matches(
    period: PeriodFilter,
    windows: &PeriodWindows,
    event: &ReactionEvent,
) -> bool {
    windows.matches(period, event.created_at)
}

/// Derive the filtered view. An event is visible iff it passes all three
/// axis predicates independently.
pub fn visible<'a>(
    events: impl Iterator<Item = &'a ReactionEvent>,
    filter: &FilterState,
    windows: &PeriodWindows,
) -> Vec<&'a ReactionEvent> {
    events
        .filter(|e| kind_matches(filter.kind, e))
        .filter(|e| target_matches(filter.target, filter.target_detail.as_deref(), e))
        .filter(|e| period_matches(filter.period, windows, e))
        .collect()
}
