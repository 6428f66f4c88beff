//! Spike-timing-dependent plasticity feedback: on fire, compares the
//! firing time against recent pre-spike events and issues signed weight
//! adjustments upstream.

use crate::ids::UnitId;
use crate::time::{Duration, Time};
use std::collections::VecDeque;

/// Configuration for a [`StdpController`], validated at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StdpConfig {
    /// Master enable/disable switch
    pub enabled: bool,
    /// Gain on the weight-change formula
    pub learning_rate: f64,
    /// Decay time constant in the exponential
    pub time_constant: Duration,
    /// Only pre-spikes within this window of the post-spike are considered
    pub window_size: Duration,
    /// Multiplier applied to the LTD branch
    pub asymmetry_ratio: f64,
    /// Lower bound passed through to the upstream weight clamp
    pub min_weight: f64,
    /// Upper bound passed through to the upstream weight clamp
    pub max_weight: f64,
}

impl StdpConfig {
    /// A disabled configuration; `Handle` and fire hooks become no-ops.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            learning_rate: 0.0,
            time_constant: Duration::ZERO,
            window_size: Duration::ZERO,
            asymmetry_ratio: 1.0,
            min_weight: 0.0,
            max_weight: 1.0,
        }
    }
}

/// One recent pre-spike event awaiting a possible fire hook.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PreSpikeRecord {
    source_id_index: usize,
    timestamp: Time,
}

/// A computed weight adjustment to apply to the synapse from `source_id`,
/// bound for the upstream plasticity callback.
#[derive(Debug, Clone, PartialEq)]
pub struct PlasticityAdjustment {
    /// The upstream synapse's source unit
    pub source_id: UnitId,
    /// `tPre - tPost`
    pub delta_t: Duration,
    /// Sign carried separately since [`Duration`] is unsigned
    pub delta_t_is_negative: bool,
    /// The signed weight change to apply
    pub weight_change: f64,
}

/// Tracks recent pre-spike events per source and, on fire, converts each
/// into a signed weight adjustment via an exponential decay of |Δt|, with
/// a fixed LTD value at Δt == 0 and an asymmetry multiplier applied only
/// to the LTD branch.
#[derive(Debug, Clone)]
pub struct StdpController {
    config: StdpConfig,
    source_ids: Vec<UnitId>,
    history: VecDeque<PreSpikeRecord>,
}

impl StdpController {
    /// Construct a new controller from its configuration.
    pub fn new(config: StdpConfig) -> Self {
        Self {
            config,
            source_ids: Vec::new(),
            history: VecDeque::new(),
        }
    }

    /// True when this controller is disabled.
    pub fn is_disabled(&self) -> bool {
        !self.config.enabled
    }

    fn intern(&mut self, source_id: &UnitId) -> usize {
        if let Some(idx) = self.source_ids.iter().position(|id| id == source_id) {
            return idx;
        }
        self.source_ids.push(source_id.clone());
        self.source_ids.len() - 1
    }

    /// Record an inbound pre-spike event and evict anything older than
    /// `window_size`. No-op when disabled.
    pub fn handle(&mut self, source_id: &UnitId, now: Time) {
        if self.is_disabled() {
            return;
        }

        let idx = self.intern(source_id);
        self.history.push_back(PreSpikeRecord {
            source_id_index: idx,
            timestamp: now,
        });

        while let Some(front) = self.history.front() {
            if now.saturating_since(front.timestamp) >= self.config.window_size {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }

    /// Evaluate every recent pre-spike against a fire at `t_post`, returning
    /// one [`PlasticityAdjustment`] per event within the window. Empty when
    /// disabled or when no recent events qualify.
    pub fn on_fire(&mut self, t_post: Time) -> Vec<PlasticityAdjustment> {
        if self.is_disabled() {
            return Vec::new();
        }

        let mut adjustments = Vec::with_capacity(self.history.len());
        for record in &self.history {
            let (delta_t, is_negative) = signed_delta(record.timestamp, t_post);
            if delta_t >= self.config.window_size {
                continue;
            }

            let weight_change = if delta_t == Duration::ZERO {
                -self.config.learning_rate * self.config.asymmetry_ratio
            } else {
                let magnitude = self.config.learning_rate
                    * (-delta_t.as_secs_f64() / self.config.time_constant.as_secs_f64()).exp();
                if is_negative {
                    magnitude
                } else {
                    -magnitude * self.config.asymmetry_ratio
                }
            };

            adjustments.push(PlasticityAdjustment {
                source_id: self.source_ids[record.source_id_index].clone(),
                delta_t,
                delta_t_is_negative: is_negative,
                weight_change,
            });
        }

        adjustments
    }
}

/// `Δt = tPre - tPost` as an (unsigned magnitude, is-negative) pair, since
/// [`Duration`] cannot itself be negative.
fn signed_delta(t_pre: Time, t_post: Time) -> (Duration, bool) {
    if t_pre < t_post {
        (t_post.saturating_since(t_pre), true)
    } else {
        (t_pre.saturating_since(t_post), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(window_ms: u64) -> StdpConfig {
        StdpConfig {
            enabled: true,
            learning_rate: 0.01,
            time_constant: Duration::from_millis(20),
            window_size: Duration::from_millis(window_ms),
            asymmetry_ratio: 1.0,
            min_weight: -1.0,
            max_weight: 1.0,
        }
    }

    #[test]
    fn test_ltp_on_causal_pre_before_post() {
        // pre at t=0, post at t=5ms, delta_t = -5ms -> LTP.
        let mut ctrl = StdpController::new(config(50));
        let src = UnitId::new("src");
        ctrl.handle(&src, Time::from_millis(0));

        let adjustments = ctrl.on_fire(Time::from_millis(5));
        assert_eq!(adjustments.len(), 1);
        assert!(adjustments[0].delta_t_is_negative);
        assert!((adjustments[0].weight_change - 0.00778801).abs() < 1e-8);
    }

    #[test]
    fn test_ltd_on_anticausal_post_before_pre() {
        // same magnitude, opposite sign.
        let mut ctrl = StdpController::new(config(50));
        let src = UnitId::new("src");
        ctrl.handle(&src, Time::from_millis(5));

        let adjustments = ctrl.on_fire(Time::from_millis(0));
        assert_eq!(adjustments.len(), 1);
        assert!(!adjustments[0].delta_t_is_negative);
        assert!((adjustments[0].weight_change - (-0.00778801)).abs() < 1e-8);
    }

    #[test]
    fn test_zero_delta_is_fixed_ltd() {
        let mut ctrl = StdpController::new(config(50));
        let src = UnitId::new("src");
        ctrl.handle(&src, Time::from_millis(10));

        let adjustments = ctrl.on_fire(Time::from_millis(10));
        assert_eq!(adjustments.len(), 1);
        assert_eq!(adjustments[0].weight_change, -0.01);
    }

    #[test]
    fn test_boundary_at_window_size_is_zero_change() {
        let mut ctrl = StdpController::new(config(50));
        let src = UnitId::new("src");
        ctrl.handle(&src, Time::from_millis(0));

        // |Δt| == window_size exactly: excluded both at handle-eviction
        // time and at on_fire time.
        let adjustments = ctrl.on_fire(Time::from_millis(50));
        assert!(adjustments.is_empty());
    }

    #[test]
    fn test_disabled_controller_is_a_no_op() {
        let mut ctrl = StdpController::new(StdpConfig::disabled());
        let src = UnitId::new("src");
        ctrl.handle(&src, Time::from_millis(0));
        assert!(ctrl.on_fire(Time::from_millis(5)).is_empty());
    }

    #[test]
    fn test_asymmetry_ratio_scales_ltd_only() {
        let mut cfg = config(50);
        cfg.asymmetry_ratio = 2.0;
        let mut ctrl = StdpController::new(cfg);
        let src = UnitId::new("src");

        ctrl.handle(&src, Time::from_millis(5));
        let ltd = ctrl.on_fire(Time::from_millis(0));
        assert!((ltd[0].weight_change - (-0.01557602)).abs() < 1e-8);
    }

    #[test]
    fn test_multiple_sources_tracked_independently() {
        let mut ctrl = StdpController::new(config(50));
        let a = UnitId::new("a");
        let b = UnitId::new("b");
        ctrl.handle(&a, Time::from_millis(0));
        ctrl.handle(&b, Time::from_millis(2));

        let adjustments = ctrl.on_fire(Time::from_millis(5));
        assert_eq!(adjustments.len(), 2);
        let sources: Vec<_> = adjustments.iter().map(|a| a.source_id.clone()).collect();
        assert!(sources.contains(&a));
        assert!(sources.contains(&b));
    }
}
