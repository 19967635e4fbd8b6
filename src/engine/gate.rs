//! Submission gating: rate limit + content check
//!
//! Both checks must pass. The rate limiter tracks a persisted per-client
//! last-submit timestamp and records it the moment a submission is accepted,
//! before the network write, so a rapid double-tap cannot slip two posts
//! through while the first is in flight. The content check is a plain
//! substring scan, not word-boundary aware; coarse filtering is the accepted
//! tradeoff here. Rejected content is never logged by the gate.

use super::types::Channel;
use crate::backend::submit_log::SubmitLog;
use std::sync::Arc;

/// Minimum interval between accepted submissions per client.
pub const SUBMIT_INTERVAL_MS: i64 = 1_000;

/// Minimal prohibited-word list, matched as exact substrings.
const PROHIBITED_WORDS: &[&str] = &[
    "死ね", "ばか", "バカ", "きもい", "キモい", "うざい", "ウザい",
    "くず", "クズ", "あほ", "アホ", "レイプ",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    Rejected(RejectReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Previous accepted submission was less than the interval ago
    RateLimited,
    /// Message contains a prohibited substring
    ProhibitedContent,
    /// Message exceeds the channel's length bound
    TooLong { limit: usize },
}

impl RejectReason {
    /// Non-punitive message shown to the submitting user.
    pub fn user_message(&self) -> String {
        match self {
            RejectReason::RateLimited => "ごめんね、連打はできません🙏".to_string(),
            RejectReason::ProhibitedContent => "NGワードが含まれています".to_string(),
            RejectReason::TooLong { limit } => {
                format!("メッセージは{}文字までだよ", limit)
            }
        }
    }
}

/// Per-channel free-text length bound, in characters.
pub fn message_limit(channel: &Channel) -> Option<usize> {
    match channel {
        Channel::Support => Some(200),
        Channel::Qa => Some(100),
        _ => None,
    }
}

pub fn contains_prohibited_words(text: &str) -> bool {
    PROHIBITED_WORDS.iter().any(|word| text.contains(word))
}

pub struct SubmissionGate {
    submit_log: Arc<dyn SubmitLog>,
}

impl SubmissionGate {
    pub fn new(submit_log: Arc<dyn SubmitLog>) -> Self {
        Self { submit_log }
    }

    /// Validate a candidate submission.
    ///
    /// On `Allowed` the client's last-submit timestamp has already been
    /// recorded; the caller performs the network write afterwards and does
    /// not roll the timestamp back on write failure.
    pub fn accept(
        &self,
        client_key: &str,
        channel: &Channel,
        text: Option<&str>,
        now_ms: i64,
    ) -> Result<GateDecision, Box<dyn std::error::Error + Send + Sync>> {
        if let Some(text) = text {
            if let Some(limit) = message_limit(channel) {
                if text.chars().count() > limit {
                    return Ok(GateDecision::Rejected(RejectReason::TooLong { limit }));
                }
            }
            if contains_prohibited_words(text) {
                return Ok(GateDecision::Rejected(RejectReason::ProhibitedContent));
            }
        }

        if let Some(last) = self.submit_log.last_submit_ms(client_key)? {
            if now_ms - last < SUBMIT_INTERVAL_MS {
                return Ok(GateDecision::Rejected(RejectReason::RateLimited));
            }
        }

        // Record before the write completes: the next tap must see it
        self.submit_log.record(client_key, now_ms)?;
        Ok(GateDecision::Allowed)
    }
}
