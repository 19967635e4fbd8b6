//! Canonical reaction event types and wire-shape normalization
//!
//! `RawAction` is the shape the backend delivers (bulk rows and realtime
//! payloads alike). It is converted into a `ReactionEvent` exactly once, at
//! the ingestion boundary, which is also where legacy field values are
//! normalized. Nothing downstream ever sees a non-canonical value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level category of a reaction event.
///
/// Unknown wire values are preserved rather than rejected: a malformed
/// channel must never drop an event, it just renders with fallback glyphs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    Emotion,
    Support,
    Qa,
    Other(String),
}

impl Channel {
    pub fn parse(s: &str) -> Self {
        match s {
            "emotion" => Channel::Emotion,
            "support" => Channel::Support,
            "qa" => Channel::Qa,
            other => Channel::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Channel::Emotion => "emotion",
            Channel::Support => "support",
            Channel::Qa => "qa",
            Channel::Other(s) => s,
        }
    }
}

/// Coarse audience/recipient category for an event.
///
/// The legacy wire value `frogs` is an alias for `Pitch` and is folded in
/// here, at the single parse point. Derived state never stores `frogs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetGroup {
    All,
    Venue,
    Talk,
    Pitch,
}

impl TargetGroup {
    /// Parse a wire value. Absent or unrecognized values fall back to `All`,
    /// matching how the screen treats rows written before the column existed.
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("venue") => TargetGroup::Venue,
            Some("talk") => TargetGroup::Talk,
            // Legacy rows: frogs was the original name of the pitch block
            Some("pitch") | Some("frogs") => TargetGroup::Pitch,
            _ => TargetGroup::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetGroup::All => "all",
            TargetGroup::Venue => "venue",
            TargetGroup::Talk => "talk",
            TargetGroup::Pitch => "pitch",
        }
    }
}

/// The canonical unit flowing through the engine. Immutable once admitted.
#[derive(Debug, Clone)]
pub struct ReactionEvent {
    /// Opaque unique identifier, assigned by the backend
    pub id: String,
    pub channel: Channel,
    /// Category tag, meaningful only within its channel (emotion kind,
    /// support-reaction kind, or "question")
    pub action_key: String,
    /// Optional free text (bounded at submission time, not here)
    pub message: Option<String>,
    /// Optional reference to an externally hosted image
    pub image_ref: Option<String>,
    pub target_group: TargetGroup,
    /// Sub-target scoped to `target_group`; meaningless when target is All
    pub target_detail_id: Option<String>,
    /// Author label, resolved from the identity store when absent
    pub display_name: Option<String>,
    /// Authoritative for ordering and period filtering
    pub created_at: DateTime<Utc>,
    /// True only for qa-channel events
    pub is_question: bool,
}

impl ReactionEvent {
    pub fn has_message(&self) -> bool {
        self.message
            .as_deref()
            .map(|m| !m.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Wire shape of an event row as the backend delivers it.
///
/// Field names match the backend schema; `to_pitch_id` is the historical
/// column name for the target detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAction {
    pub id: String,
    pub channel: String,
    pub action_key: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub target_group: Option<String>,
    #[serde(default)]
    pub to_pitch_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub client_key: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_question: bool,
}

impl RawAction {
    /// Normalize into the canonical event shape.
    ///
    /// This is the only place `frogs` aliasing and missing-field defaults
    /// are handled; everything downstream relies on that.
    pub fn into_event(self) -> ReactionEvent {
        let channel = Channel::parse(&self.channel);
        // Derived from the channel alone; the wire flag is advisory at best
        // (legacy writers set it inconsistently)
        let is_question = channel == Channel::Qa;
        ReactionEvent {
            id: self.id,
            action_key: self.action_key.unwrap_or_default(),
            message: self.message,
            image_ref: self.image_url,
            target_group: TargetGroup::parse(self.target_group.as_deref()),
            // "ALL" is the historical sentinel for "no specific pitch"
            target_detail_id: self
                .to_pitch_id
                .filter(|p| !p.is_empty() && p != "ALL"),
            display_name: self.display_name,
            created_at: self.created_at,
            is_question,
            channel,
        }
    }
}

/// A reaction event plus its assigned screen position.
///
/// Coordinates are percentages of the screen in [0,100]. `fixed` records
/// that the position was assigned at first insertion and must never be
/// recomputed while the item remains in the window.
#[derive(Debug, Clone)]
pub struct VisibleItem {
    pub event: ReactionEvent,
    pub x: f64,
    pub y: f64,
    pub fixed: bool,
}
