//! Backend collaborator surface
//!
//! Everything the engine needs from the outside world sits behind
//! `EventBackend`: the bulk query, the display-cutoff config value, identity
//! resolution and the submission write. The live subscription is not part of
//! the trait; it arrives as an mpsc channel of `RawAction` wired up by the
//! runtime, since push delivery and request/response have different shapes.

pub mod http;
pub mod submit_log;

pub use http::HttpEventBackend;
pub use submit_log::{MemorySubmitLog, SqliteSubmitLog, SubmitLog};

use crate::engine::types::RawAction;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Fields for a new event row, as the submission write sends them.
#[derive(Debug, Clone, serde::Serialize)]
pub struct NewAction {
    pub client_key: String,
    pub channel: String,
    pub action_key: Option<String>,
    pub message: Option<String>,
    pub is_question: bool,
    pub display_name: Option<String>,
    pub target_group: String,
    pub to_pitch_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl NewAction {
    /// An emotion tap: no free text, never a question.
    pub fn emotion(client_key: &str, action_key: &str, target_group: &str) -> Self {
        Self {
            client_key: client_key.to_string(),
            channel: "emotion".to_string(),
            action_key: Some(action_key.to_string()),
            message: None,
            is_question: false,
            display_name: None,
            target_group: target_group.to_string(),
            to_pitch_id: None,
            image_url: None,
        }
    }

    /// A support post: optional reaction kind, optional message and image.
    pub fn support(
        client_key: &str,
        action_key: Option<&str>,
        message: Option<&str>,
        target_group: &str,
    ) -> Self {
        Self {
            client_key: client_key.to_string(),
            channel: "support".to_string(),
            action_key: action_key.map(|k| k.to_string()),
            message: message.map(|m| m.trim().to_string()).filter(|m| !m.is_empty()),
            is_question: false,
            display_name: None,
            target_group: target_group.to_string(),
            to_pitch_id: None,
            image_url: None,
        }
    }

    /// A qa post: always a question.
    pub fn question(client_key: &str, message: &str, target_group: &str) -> Self {
        Self {
            client_key: client_key.to_string(),
            channel: "qa".to_string(),
            action_key: Some("question".to_string()),
            message: Some(message.trim().to_string()),
            is_question: true,
            display_name: None,
            target_group: target_group.to_string(),
            to_pitch_id: None,
            image_url: None,
        }
    }

    pub fn with_display_name(mut self, name: Option<&str>) -> Self {
        self.display_name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        self
    }

    pub fn with_target_detail(mut self, detail: Option<&str>) -> Self {
        self.to_pitch_id = detail.map(|d| d.to_string());
        self
    }

    pub fn with_image(mut self, url: Option<&str>) -> Self {
        self.image_url = url.map(|u| u.to_string());
        self
    }
}

/// Why a submission did not reach the backend.
#[derive(Debug)]
pub enum SubmitError {
    /// The gate rejected it; carries the user-facing reason
    Rejected(crate::engine::gate::RejectReason),
    /// The write (or the gate's own store) failed. Not retried; the rate
    /// slot stays consumed either way.
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::Rejected(reason) => write!(f, "submission rejected: {:?}", reason),
            SubmitError::Backend(e) => write!(f, "submission failed: {}", e),
        }
    }
}

impl std::error::Error for SubmitError {}

/// Gate-then-write submission front.
///
/// The one path through which client submissions reach the backend: the
/// gate runs first, and only an accepted action is written. A write failure
/// after acceptance does not roll the rate-limit timestamp back.
pub struct ActionSubmitter {
    backend: std::sync::Arc<dyn EventBackend>,
    gate: crate::engine::gate::SubmissionGate,
}

impl ActionSubmitter {
    pub fn new(
        backend: std::sync::Arc<dyn EventBackend>,
        gate: crate::engine::gate::SubmissionGate,
    ) -> Self {
        Self { backend, gate }
    }

    pub async fn submit(&self, action: NewAction, now_ms: i64) -> Result<(), SubmitError> {
        use crate::engine::gate::GateDecision;
        use crate::engine::types::Channel;

        let channel = Channel::parse(&action.channel);
        match self
            .gate
            .accept(&action.client_key, &channel, action.message.as_deref(), now_ms)
        {
            Ok(GateDecision::Allowed) => {}
            Ok(GateDecision::Rejected(reason)) => return Err(SubmitError::Rejected(reason)),
            Err(e) => return Err(SubmitError::Backend(e)),
        }

        self.backend
            .insert_action(action)
            .await
            .map_err(SubmitError::Backend)
    }
}

#[async_trait]
pub trait EventBackend: Send + Sync {
    /// Current display-start-time configuration value, if set.
    async fn fetch_display_cutoff(
        &self,
    ) -> Result<Option<DateTime<Utc>>, Box<dyn std::error::Error + Send + Sync>>;

    /// Events at or after the cutoff, newest-first, up to `limit`.
    async fn fetch_recent(
        &self,
        cutoff: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Result<Vec<RawAction>, Box<dyn std::error::Error + Send + Sync>>;

    /// Display name for a client identifier, if registered.
    async fn resolve_display_name(
        &self,
        client_key: &str,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>>;

    /// Insert a new event row.
    async fn insert_action(
        &self,
        action: NewAction,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
