//! Temporal-summation dendritic operator: buffers events, emits their
//! algebraic sum on `process` — including an explicit zero.

use super::DendriticOperator;
use crate::signal::{clamp_to_sanity_bound, IntegratedPotential, MembraneSnapshot, Signal};
use crate::time::Time;

/// Sums buffered events each tick. Unlike the other variants, an empty
/// algebraic sum is still a result — `process` only returns `None` when
/// *no events at all* were buffered since the last call.
#[derive(Debug, Default)]
pub struct TemporalSummationOperator {
    sum: f64,
    buffered_events: usize,
    last_timestamp: Time,
}

impl TemporalSummationOperator {
    /// Construct a new temporal-summation operator
    pub fn new() -> Self {
        Self::default()
    }
}

impl DendriticOperator for TemporalSummationOperator {
    fn handle(&mut self, signal: &Signal) -> Option<IntegratedPotential> {
        if !signal.is_finite() {
            return None;
        }
        self.sum += signal.value;
        self.buffered_events += 1;
        self.last_timestamp = signal.timestamp;
        None
    }

    fn process(&mut self, _snapshot: MembraneSnapshot) -> Option<IntegratedPotential> {
        if self.buffered_events == 0 {
            return None;
        }

        let (net_input, clamped) = clamp_to_sanity_bound(self.sum);
        if clamped {
            log::debug!("temporal-summation operator clamped its tick sum");
        }
        let potential = IntegratedPotential::new(net_input, self.last_timestamp);

        self.sum = 0.0;
        self.buffered_events = 0;

        Some(potential)
    }

    fn name(&self) -> &'static str {
        "temporal-summation"
    }
}
