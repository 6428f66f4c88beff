//! Passive dendritic operator: no buffering, immediate pass-through.

use super::DendriticOperator;
use crate::signal::{clamp_to_sanity_bound, IntegratedPotential, MembraneSnapshot, Signal};

/// No buffer; `handle` returns an immediate potential equal to the input;
/// `process` is inert.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassiveOperator;

impl PassiveOperator {
    /// Construct a new passive operator
    pub fn new() -> Self {
        Self
    }
}

impl DendriticOperator for PassiveOperator {
    fn handle(&mut self, signal: &Signal) -> Option<IntegratedPotential> {
        if !signal.is_finite() {
            return None;
        }
        let (value, clamped) = clamp_to_sanity_bound(signal.value);
        if clamped {
            log::debug!("passive operator clamped an out-of-range signal");
        }
        Some(IntegratedPotential::new(value, signal.timestamp))
    }

    fn process(&mut self, _snapshot: MembraneSnapshot) -> Option<IntegratedPotential> {
        None
    }

    fn name(&self) -> &'static str {
        "passive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::UnitId;
    use crate::time::Time;

    fn sig(value: f64) -> Signal {
        Signal::new(value, Time::ZERO, UnitId::new("a"), UnitId::new("b"))
    }

    #[test]
    fn test_handle_returns_immediate_potential() {
        let mut op = PassiveOperator::new();
        let potential = op.handle(&sig(1.5)).unwrap();
        assert_eq!(potential.net_input, 1.5);
    }

    #[test]
    fn test_handle_drops_non_finite_signals() {
        let mut op = PassiveOperator::new();
        assert!(op.handle(&sig(f64::NAN)).is_none());
        assert!(op.handle(&sig(f64::INFINITY)).is_none());
    }

    #[test]
    fn test_process_never_emits() {
        let mut op = PassiveOperator::new();
        let snapshot = MembraneSnapshot {
            accumulator: 0.0,
            current_threshold: 1.0,
        };
        assert!(op.process(snapshot).is_none());
    }

    #[test]
    fn test_handle_clamps_extreme_values() {
        let mut op = PassiveOperator::new();
        let potential = op.handle(&sig(1e20)).unwrap();
        assert_eq!(potential.net_input, crate::signal::SANITY_BOUND);
    }
}
