//! Tap vs. hold classification for the scene buttons
//!
//! Presses are keyed by `ButtonId`. An entry lives exactly as long as the
//! button is physically held: it is created on press and removed by the
//! matching release, whether or not the release gets classified.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::surface::ButtonId;

/// Default hold threshold
pub const DEFAULT_HOLD_THRESHOLD: Duration = Duration::from_millis(500);

/// Outcome of a press/release pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Tap,
    Hold,
}

/// Per-button press timestamps
#[derive(Debug, Clone)]
pub struct GestureTracker {
    threshold: Duration,
    pressed_at: HashMap<ButtonId, Instant>,
}

impl GestureTracker {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            pressed_at: HashMap::new(),
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: Duration) {
        self.threshold = threshold;
    }

    /// Record a press, replacing any earlier entry for the same button
    pub fn press(&mut self, button: ButtonId, at: Instant) {
        self.pressed_at.insert(button, at);
    }

    /// Classify and forget a release.
    ///
    /// A release without a recorded press counts as a hold.
    pub fn release(&mut self, button: ButtonId, at: Instant) -> Gesture {
        match self.pressed_at.remove(&button) {
            Some(pressed) if at.saturating_duration_since(pressed) < self.threshold => Gesture::Tap,
            _ => Gesture::Hold,
        }
    }

    /// Drop a press without classifying it
    pub fn forget(&mut self, button: ButtonId) -> bool {
        self.pressed_at.remove(&button).is_some()
    }

    pub fn is_held(&self, button: ButtonId) -> bool {
        self.pressed_at.contains_key(&button)
    }

    pub fn held_count(&self) -> usize {
        self.pressed_at.len()
    }

    pub fn clear(&mut self) {
        self.pressed_at.clear();
    }
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new(DEFAULT_HOLD_THRESHOLD)
    }
}
