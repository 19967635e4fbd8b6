//! Per-channel running totals
//!
//! Counters track everything admitted since startup, independent of the
//! visible window: bubbles get evicted, the totals keep climbing. Unknown
//! channels are not counted.

use super::types::Channel;

#[derive(Debug, Default)]
pub struct CounterAggregator {
    support: u64,
    qa: u64,
    emotion: u64,
}

/// Read-only copy handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub support: u64,
    pub qa: u64,
    pub emotion: u64,
}

impl CounterSnapshot {
    pub fn total(&self) -> u64 {
        self.support + self.qa + self.emotion
    }
}

impl CounterAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, channel: &Channel) {
        match channel {
            Channel::Support => self.support += 1,
            Channel::Qa => self.qa += 1,
            Channel::Emotion => self.emotion += 1,
            Channel::Other(_) => {}
        }
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            support: self.support,
            qa: self.qa,
            emotion: self.emotion,
        }
    }
}
