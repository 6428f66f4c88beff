//! Shunting dendritic operator: separate excitatory/inhibitory pools,
//! divisive inhibition via [`super::BiophysicalConfig::shunt`], then spatial
//! decay.

use super::{BiophysicalConfig, DendriticOperator};
use crate::signal::{clamp_to_sanity_bound, IntegratedPotential, MembraneSnapshot, Signal};
use crate::time::Time;

/// Tuning specific to the shunting variant: which sign of input counts as
/// inhibitory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShuntingConfig {
    /// Signals at or below this value are treated as inhibitory; above, excitatory.
    pub inhibitory_threshold: f64,
}

impl Default for ShuntingConfig {
    fn default() -> Self {
        Self {
            inhibitory_threshold: 0.0,
        }
    }
}

/// Buffers excitatory and inhibitory sums separately, applies divisive
/// shunting and spatial decay on `process`. Like the temporal-summation
/// variant, an empty algebraic result is still emitted as long as at least
/// one event was buffered.
#[derive(Debug, Default)]
pub struct ShuntingOperator {
    config: ShuntingConfig,
    biophysics: BiophysicalConfig,
    sum_exc: f64,
    sum_inh: f64,
    buffered_events: usize,
    last_timestamp: Time,
}

impl ShuntingOperator {
    /// Construct a new shunting operator with the given tunables.
    pub fn new(config: ShuntingConfig, biophysics: BiophysicalConfig) -> Self {
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

impl DendriticOperator for ShuntingOperator {
    fn handle(&mut self, signal: &Signal) -> Option<IntegratedPotential> {
        if !signal.is_finite() {
            return None;
        }
        if signal.value <= self.config.inhibitory_threshold {
            self.sum_inh += signal.value.abs();
        } else {
            self.sum_exc += signal.value;
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
        let decayed = shunted * self.biophysics.spatial_decay;

        let (net_input, clamped) = clamp_to_sanity_bound(decayed);
        if clamped {
            log::debug!("shunting operator clamped its tick output");
        }
        let potential = IntegratedPotential::new(net_input, self.last_timestamp);

        self.sum_exc = 0.0;
        self.sum_inh = 0.0;
        self.buffered_events = 0;

        Some(potential)
    }

    fn name(&self) -> &'static str {
        "shunting"
    }
}
