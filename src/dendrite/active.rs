//! Active-nonlinear dendritic operator: per-event saturation, shunting,
//! spatial decay, and an NMDA-style dendritic-spike boost once integrated
//! excitation crosses a threshold.

use super::{BiophysicalConfig, DendriticOperator};
use crate::signal::{clamp_to_sanity_bound, IntegratedPotential, MembraneSnapshot, Signal};
use crate::time::Time;

/// Tuning specific to the active-nonlinear variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveNonlinearConfig {
    /// Per-event saturation ceiling applied before any pooling
    pub max_synaptic_effect: f64,
    /// Signals at or below this value are treated as inhibitory; above, excitatory.
    pub inhibitory_threshold: f64,
    /// Integrated excitation level above which the dendritic-spike boost fires
    pub dendritic_spike_threshold: f64,
    /// Additive boost applied once the dendritic-spike threshold is crossed
    pub nmda_spike_amplitude: f64,
}

impl Default for ActiveNonlinearConfig {
    fn default() -> Self {
        Self {
            max_synaptic_effect: 5.0,
            inhibitory_threshold: 0.0,
            dendritic_spike_threshold: 3.0,
            nmda_spike_amplitude: 2.0,
        }
    }
}

/// Buffers saturated excitatory/inhibitory pools, shunts and spatially
/// decays them on `process`, then applies an NMDA-spike boost if the
/// pre-boost excitatory pool alone crosses the configured threshold.
#[derive(Debug, Default)]
pub struct ActiveNonlinearOperator {
    config: ActiveNonlinearConfig,
    biophysics: BiophysicalConfig,
    sum_exc: f64,
    sum_inh: f64,
    buffered_events: usize,
    last_timestamp: Time,
}

impl ActiveNonlinearOperator {
    /// Construct a new active-nonlinear operator with the given tunables.
    pub fn new(config: ActiveNonlinearConfig, biophysics: BiophysicalConfig) -> Self {
        Self {
            config,
            biophysics,
            sum_exc: 0.0,
            sum_inh: 0.0,
            buffered_events: 0,
            last_timestamp: Time::ZERO,
        }
    }
}

impl DendriticOperator for ActiveNonlinearOperator {
    fn handle(&mut self, signal: &Signal) -> Option<IntegratedPotential> {
        if !signal.is_finite() {
            return None;
        }
        let saturated = signal
            .value
            .clamp(-self.config.max_synaptic_effect, self.config.max_synaptic_effect);

        if saturated <= self.config.inhibitory_threshold {
            self.sum_inh += saturated.abs();
        } else {
            self.sum_exc += saturated;
        }
        self.buffered_events += 1;
        self.last_timestamp = signal.timestamp;
        None
    }

    fn process(&mut self, _snapshot: MembraneSnapshot) -> Option<IntegratedPotential> {
        if self.buffered_events == 0 {
            return None;
        }

        let shunted = self.biophysics.shunt(self.sum_exc, self.sum_inh);
        let mut decayed = shunted * self.biophysics.spatial_decay;

        if self.sum_exc >= self.config.dendritic_spike_threshold {
            decayed += self.config.nmda_spike_amplitude;
        }

        let (net_input, clamped) = clamp_to_sanity_bound(decayed);
        if clamped {
            log::debug!("active-nonlinear operator clamped its tick output");
        }
        let potential = IntegratedPotential::new(net_input, self.last_timestamp);

        self.sum_exc = 0.0;
        self.sum_inh = 0.0;
        self.buffered_events = 0;

        Some(potential)
    }

    fn name(&self) -> &'static str {
        "active-nonlinear"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::UnitId;

    fn sig(value: f64, t_ms: u64) -> Signal {
        Signal::new(
            value,
            Time::from_millis(t_ms),
            UnitId::new("a"),
            UnitId::new("b"),
        )
    }

    fn snapshot() -> MembraneSnapshot {
        MembraneSnapshot {
            accumulator: 0.0,
            current_threshold: 1.0,
        }
    }

    #[test]
    fn test_per_event_saturation_caps_extreme_values() {
        let mut op = ActiveNonlinearOperator::new(
            ActiveNonlinearConfig::default(),
            BiophysicalConfig::default(),
        );
        op.handle(&sig(1000.0, 1));

        let potential = op.process(snapshot()).unwrap();
        // saturated to 5.0, no inhibition -> shunt gain 1.0, decay 0.7,
        // then boosted since 5.0 >= threshold 3.0.
        assert!((potential.net_input - (5.0 * 0.7 + 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_below_spike_threshold_no_boost() {
        let mut op = ActiveNonlinearOperator::new(
            ActiveNonlinearConfig::default(),
            BiophysicalConfig::default(),
        );
        op.handle(&sig(1.0, 1));

        let potential = op.process(snapshot()).unwrap();
        assert!((potential.net_input - (1.0 * 0.7)).abs() < 1e-9);
    }

    #[test]
    fn test_at_exactly_threshold_boost_fires() {
        let mut op = ActiveNonlinearOperator::new(
            ActiveNonlinearConfig::default(),
            BiophysicalConfig::default(),
        );
        op.handle(&sig(3.0, 1));

        let potential = op.process(snapshot()).unwrap();
        assert!((potential.net_input - (3.0 * 0.7 + 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_empty_buffer_returns_no_result() {
        let mut op = ActiveNonlinearOperator::new(
            ActiveNonlinearConfig::default(),
            BiophysicalConfig::default(),
        );
        assert!(op.process(snapshot()).is_none());
    }

    #[test]
    fn test_buffers_clear_between_ticks() {
        let mut op = ActiveNonlinearOperator::new(
            ActiveNonlinearConfig::default(),
            BiophysicalConfig::default(),
        );
        op.handle(&sig(3.0, 1));
        op.process(snapshot());
        assert!(op.process(snapshot()).is_none());
    }
}
