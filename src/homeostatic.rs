//! Homeostatic threshold controller: tracks firing history and a calcium
//! proxy, nudges the firing threshold toward a target rate.

use crate::time::{Duration, Time};
use std::collections::VecDeque;

/// Per-ms multiplicative decay applied to the calcium proxy ").
const CALCIUM_DECAY_PER_MS: f64 = 0.99;

/// Fixed calcium increment added on every fire.
const CALCIUM_FIRE_INCREMENT: f64 = 1.0;

/// Multiplier applied to `base_threshold` to derive `min_threshold`.
const MIN_THRESHOLD_FACTOR: f64 = 0.1;

/// Multiplier applied to `base_threshold` to derive `max_threshold`.
const MAX_THRESHOLD_FACTOR: f64 = 5.0;

/// Gain applied to the rate-error term before it nudges the threshold.
const STEP_SCALE: f64 = 0.01;

/// Tracks recent firing activity and a calcium proxy, nudging `threshold`
/// toward `target_firing_rate`, and snapping back to `base_threshold`
/// whenever homeostasis is disabled.
#[derive(Debug, Clone)]
pub struct HomeostaticController {
    target_firing_rate: f64,
    homeostasis_strength: f64,
    base_threshold: f64,
    activity_window: Duration,
    calcium_level: f64,
    firing_history: VecDeque<Time>,
    min_threshold: f64,
    max_threshold: f64,
}

impl HomeostaticController {
    /// Construct a new controller. Disabled iff both `target_firing_rate`
    /// and `homeostasis_strength` are zero.
    pub fn new(
        target_firing_rate: f64,
        homeostasis_strength: f64,
        base_threshold: f64,
        activity_window: Duration,
    ) -> Self {
        Self {
            target_firing_rate,
            homeostasis_strength,
            base_threshold,
            activity_window,
            calcium_level: 0.0,
            firing_history: VecDeque::new(),
            min_threshold: base_threshold * MIN_THRESHOLD_FACTOR,
            max_threshold: base_threshold * MAX_THRESHOLD_FACTOR,
        }
    }

    /// True when both target rate and strength are zero.
    pub fn is_disabled(&self) -> bool {
        self.target_firing_rate == 0.0 && self.homeostasis_strength == 0.0
    }

    /// Record a fire: append to history, pulse calcium.
    pub fn on_fire(&mut self, now: Time) {
        self.firing_history.push_back(now);
        self.calcium_level += CALCIUM_FIRE_INCREMENT;
    }

    /// Current observed firing rate in Hz, based on the retained history.
    pub fn current_rate(&self) -> f64 {
        let window_secs = self.activity_window.as_secs_f64();
        if window_secs <= 0.0 {
            return 0.0;
        }
        self.firing_history.len() as f64 / window_secs
    }

    /// Current calcium proxy level, always non-negative.
    pub fn calcium_level(&self) -> f64 {
        self.calcium_level
    }

    /// Advance the controller by one tick: evict stale history, decay
    /// calcium, and nudge `threshold` toward the target rate. Returns the
    /// new threshold. If the controller is disabled, snaps to
    /// `base_threshold` and performs no other bookkeeping.
    pub fn advance(&mut self, now: Time, elapsed: Duration, current_threshold: f64) -> f64 {
        if self.is_disabled() {
            return self.base_threshold;
        }

        while let Some(&oldest) = self.firing_history.front() {
            if now.saturating_since(oldest) > self.activity_window {
                self.firing_history.pop_front();
            } else {
                break;
            }
        }

        let elapsed_ms = elapsed.as_nanos() as f64 / 1_000_000.0;
        let decay = CALCIUM_DECAY_PER_MS.powf(elapsed_ms.max(0.0));
        self.calcium_level = (self.calcium_level * decay).max(0.0);

        let rate_error = self.current_rate() - self.target_firing_rate;
        let delta = self.homeostasis_strength * rate_error * STEP_SCALE;
        let updated = (current_threshold + delta).clamp(self.min_threshold, self.max_threshold);
        updated
    }

    /// `[min_threshold, max_threshold]`, derived from `base_threshold`.
    pub fn bounds(&self) -> (f64, f64) {
        (self.min_threshold, self.max_threshold)
    }

    /// The immutable origin threshold, returned on disable.
    pub fn base_threshold(&self) -> f64 {
        self.base_threshold
    }
}
