//! # Reaction Stream Engine
//!
//! In-memory engine behind the venue screen: it ingests audience reaction
//! events, keeps a bounded recency window with stable spatial positions,
//! schedules transient visual effects, and gates outgoing submissions.
//!
//! ## Architecture: window-only state
//!
//! **Key principle:** the screen never stores history. The backend owns the
//! durable record; this engine holds only what is currently displayable.
//!
//! 1. Raw actions arrive from the backend (bulk load, then live appends)
//! 2. Each is normalized once at the edge (`frogs`→`pitch`, qa→question)
//! 3. The bounded window evicts oldest-first; counters keep running totals
//! 4. Positions are assigned once per window residence and never reshuffled
//! 5. Live admissions spawn short-lived effects, swept by the runtime tick
//!
//! Benefits:
//! - Constant memory footprint (bounded window, capped effect pool)
//! - A crashed screen recovers from the backend, never from local state
//! - Read-only views make the presentation layer a pure consumer
//!
//! ## Module Organization
//!
//! - `types` - canonical event model and raw wire shape
//! - `labels` - channel glyph/label tables
//! - `store` - bounded recency window
//! - `counters` - running per-channel totals
//! - `filter` - kind/target/period view filtering
//! - `placement` - center-biased stable positions
//! - `effects` - transient effect scheduling and expiry
//! - `gate` - submission rate limiting and content checks
//! - `ingest` - bulk load and live admission paths
//! - `screen` - the owned state container tying it together

pub mod types;
pub mod labels;
pub mod store;
pub mod counters;
pub mod filter;
pub mod placement;
pub mod effects;
pub mod gate;
pub mod ingest;
pub mod screen;

// Re-export commonly used types
pub use types::{Channel, RawAction, ReactionEvent, TargetGroup, VisibleItem};
pub use counters::CounterSnapshot;
pub use effects::{EffectInstance, EffectKind};
pub use filter::{FilterState, KindFilter, PeriodFilter, PeriodWindows, TargetFilter};
pub use gate::{GateDecision, RejectReason, SubmissionGate};
pub use ingest::StreamIngestor;
pub use screen::{ScreenEngine, VisibleBreakdown};
