//! Short-lived visual effects spawned from live events
//!
//! Each live admission fans out into a handful of effect instances: a star
//! burst anchored to the new bubble, fireworks for support and qa posts, and
//! a full-screen glyph for allow-listed emotions. Instances are self-
//! expiring: the runtime sweeps `expire()` on a timer and removal is exact,
//! only the instances whose TTL elapsed go, never a superset. A hard cap
//! bounds concurrent instances, dropping the oldest first.

use super::labels::effect_eligible;
use super::types::{Channel, ReactionEvent};
use rand::Rng;
use std::collections::VecDeque;
use std::f64::consts::PI;

pub const GLYPH_TTL_MS: i64 = 2_000;
pub const BURST_TTL_MS: i64 = 1_500;
pub const FIREWORK_TTL_MS: i64 = 1_200;

const FIREWORK_PARTICLES: usize = 14;

#[derive(Debug, Clone, PartialEq)]
pub enum EffectKind {
    /// Full-screen emotion glyph, keyed by the emotion's action key
    EmotionGlyph { key: String },
    /// One star of a burst around a freshly placed bubble
    BurstStar { color: &'static str },
    /// The cloud puff that rides above qa bursts
    BurstCloud,
    /// One firework particle with its flight vector and stagger delay
    Firework {
        color: &'static str,
        dx: f64,
        dy: f64,
        delay_ms: u64,
    },
}

/// Ephemeral, never persisted. Position is percent-of-screen.
#[derive(Debug, Clone)]
pub struct EffectInstance {
    pub id: u64,
    pub kind: EffectKind,
    pub x: f64,
    pub y: f64,
    /// Unix milliseconds at spawn
    pub spawned_at: i64,
    pub ttl_ms: i64,
}

impl EffectInstance {
    pub fn expired(&self, now_ms: i64) -> bool {
        now_ms - self.spawned_at >= self.ttl_ms
    }
}

pub struct EffectScheduler<R: Rng> {
    instances: VecDeque<EffectInstance>,
    next_id: u64,
    max_instances: usize,
    rng: R,
}

impl<R: Rng> EffectScheduler<R> {
    pub fn new(max_instances: usize, rng: R) -> Self {
        Self {
            instances: VecDeque::new(),
            next_id: 0,
            max_instances,
            rng,
        }
    }

    /// Spawn the effects for a newly admitted live event.
    ///
    /// `anchor` is the bubble's assigned position; burst and firework
    /// particles radiate from it. Historical bulk-load events never reach
    /// this method. Returns the spawned instance ids (tests use them to
    /// verify exact removal).
    pub fn spawn_for_event(
        &mut self,
        event: &ReactionEvent,
        anchor: (f64, f64),
        now_ms: i64,
    ) -> Vec<u64> {
        let mut spawned = Vec::new();

        if event.channel == Channel::Emotion && effect_eligible(&event.action_key) {
            spawned.push(self.spawn_glyph(&event.action_key, now_ms));
        }

        spawned.extend(self.spawn_burst(&event.channel, anchor, now_ms));

        if matches!(event.channel, Channel::Support | Channel::Qa) {
            spawned.extend(self.spawn_fireworks(&event.channel, anchor, now_ms));
        }

        spawned
    }

    /// Full-screen emotion glyph at a random spot in the safe vertical band
    /// (clear of the header and the footer chrome).
    fn spawn_glyph(&mut self, key: &str, now_ms: i64) -> u64 {
        let x = 10.0 + self.rng.gen::<f64>() * 80.0;
        let y = 20.0 + self.rng.gen::<f64>() * 40.0;
        self.push(
            EffectKind::EmotionGlyph {
                key: key.to_string(),
            },
            x,
            y,
            now_ms,
            GLYPH_TTL_MS,
        )
    }

    /// 7-9 stars on a circle around the anchor, radius 4-10% of the screen,
    /// clamped so particles never leave the frame. qa gets an extra cloud.
    fn spawn_burst(
        &mut self,
        channel: &Channel,
        (base_x, base_y): (f64, f64),
        now_ms: i64,
    ) -> Vec<u64> {
        let color = match channel {
            Channel::Support => "#FF9ECF",
            Channel::Qa => "#A8D8FF",
            _ => "#FFE27A",
        };

        let star_count = 7 + self.rng.gen_range(0..3);
        let mut ids = Vec::with_capacity(star_count + 1);

        for i in 0..star_count {
            let angle = PI * 2.0 * i as f64 / star_count as f64;
            let radius = 4.0 + self.rng.gen::<f64>() * 6.0;
            let x = (base_x + angle.cos() * radius).clamp(5.0, 95.0);
            let y = (base_y + angle.sin() * radius).clamp(5.0, 95.0);
            ids.push(self.push(EffectKind::BurstStar { color }, x, y, now_ms, BURST_TTL_MS));
        }

        if *channel == Channel::Qa {
            ids.push(self.push(
                EffectKind::BurstCloud,
                base_x,
                base_y - 6.0,
                now_ms,
                BURST_TTL_MS,
            ));
        }

        ids
    }

    /// Fireworks for support and qa posts: particles radiate evenly with a
    /// small per-particle stagger so the shell unfolds rather than pops.
    fn spawn_fireworks(
        &mut self,
        channel: &Channel,
        (x, y): (f64, f64),
        now_ms: i64,
    ) -> Vec<u64> {
        let colors: &[&'static str] = if *channel == Channel::Support {
            &["#FF8AD1", "#FFD1F3", "#FFE0A3"]
        } else {
            &["#B3E5FF", "#E0F2FF", "#FFFFFF"]
        };

        (0..FIREWORK_PARTICLES)
            .map(|i| {
                let angle = PI * 2.0 * i as f64 / FIREWORK_PARTICLES as f64;
                let distance = 18.0 + self.rng.gen::<f64>() * 8.0;
                self.push(
                    EffectKind::Firework {
                        color: colors[i % colors.len()],
                        dx: angle.cos() * distance,
                        dy: angle.sin() * distance,
                        delay_ms: (i * 20) as u64,
                    },
                    x,
                    y,
                    now_ms,
                    FIREWORK_TTL_MS,
                )
            })
            .collect()
    }

    fn push(&mut self, kind: EffectKind, x: f64, y: f64, now_ms: i64, ttl_ms: i64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.instances.push_back(EffectInstance {
            id,
            kind,
            x,
            y,
            spawned_at: now_ms,
            ttl_ms,
        });
        // Oldest-first drop when over the cap
        while self.instances.len() > self.max_instances {
            self.instances.pop_front();
        }
        id
    }

    /// Remove exactly the instances whose TTL has elapsed.
    pub fn expire(&mut self, now_ms: i64) -> usize {
        let before = self.instances.len();
        self.instances.retain(|e| !e.expired(now_ms));
        before - self.instances.len()
    }

    /// Early removal by instance id, for effects whose trigger got evicted.
    pub fn cancel(&mut self, ids: &[u64]) {
        self.instances.retain(|e| !ids.contains(&e.id));
    }

    pub fn live(&self) -> impl Iterator<Item = &EffectInstance> {
        self.instances.iter()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
