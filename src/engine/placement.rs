//! Spatial placement for bubbles
//!
//! New bubbles land at a center-weighted random position that stays clear of
//! the mascot's resting zone. A position is assigned exactly once per window
//! residence and cached by event id: existing bubbles must not jump when new
//! ones arrive. Eviction from the window evicts the cached position too.

use rand::Rng;
use std::collections::HashMap;

/// Horizontal placement band, percent of screen width
const X_MIN: f64 = 5.0;
const X_SPAN: f64 = 90.0;
/// Vertical placement band, percent of screen height
const Y_MIN: f64 = 10.0;
const Y_SPAN: f64 = 80.0;

/// Mascot exclusion rectangle (its resting spot is screen center)
const EXCLUDE_MIN: f64 = 45.0;
const EXCLUDE_MAX: f64 = 55.0;

/// Redraw attempts before giving up on randomness. With a ~1% exclusion
/// area this is effectively never hit; the cap exists so a pathological
/// configuration cannot loop forever.
const MAX_RETRIES: u32 = 32;

/// Deterministic landing spot used when the retry cap is exhausted.
const FALLBACK: (f64, f64) = (25.0, 30.0);

pub struct PlacementAllocator<R: Rng> {
    positions: HashMap<String, (f64, f64)>,
    rng: R,
}

impl<R: Rng> PlacementAllocator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            positions: HashMap::new(),
            rng,
        }
    }

    /// Position for an event id, allocating on first sight.
    ///
    /// Repeated calls for the same id return the identical cached point for
    /// as long as the id stays in the window.
    pub fn position_for(&mut self, id: &str) -> (f64, f64) {
        if let Some(pos) = self.positions.get(id) {
            return *pos;
        }
        let pos = self.place();
        self.positions.insert(id.to_string(), pos);
        pos
    }

    /// Draw a fresh position: center-biased within the band, outside the
    /// mascot exclusion rectangle.
    pub fn place(&mut self) -> (f64, f64) {
        for _ in 0..MAX_RETRIES {
            let x = X_MIN + self.center_bias() * X_SPAN;
            let y = Y_MIN + self.center_bias() * Y_SPAN;

            let near_mascot = x > EXCLUDE_MIN
                && x < EXCLUDE_MAX
                && y > EXCLUDE_MIN
                && y < EXCLUDE_MAX;
            if !near_mascot {
                return (x, y);
            }
        }
        FALLBACK
    }

    /// Mean of two uniform draws: dispersed but visibly weighted toward the
    /// middle of the band.
    fn center_bias(&mut self) -> f64 {
        (self.rng.gen::<f64>() + self.rng.gen::<f64>()) / 2.0
    }

    /// Cached position without allocating. Read path for the view layer.
    pub fn get(&self, id: &str) -> Option<(f64, f64)> {
        self.positions.get(id).copied()
    }

    /// Drop cached positions for evicted events. A later re-insertion of the
    /// same id is treated as a brand new item.
    pub fn evict(&mut self, ids: &[String]) {
        for id in ids {
            self.positions.remove(id);
        }
    }

    pub fn cached_len(&self) -> usize {
        self.positions.len()
    }
}
