//! Per-unit configuration, validated at construction.

use crate::dendrite::{ActiveNonlinearConfig, BiophysicalConfig, ShuntingConfig};
use crate::error::{Result, RuntimeError};
use crate::ids::UnitId;
use crate::stdp::StdpConfig;
use crate::time::Duration;

/// Default bound on the per-unit scheduler.
pub const DEFAULT_MAX_SCHEDULED_SIGNALS: usize = 1000;

/// Default bound on the inbound signal queue.
pub const DEFAULT_INPUT_BUFFER_CAPACITY: usize = 100;

/// Default decay-tick cadence ").
pub const DEFAULT_DECAY_INTERVAL: Duration = Duration::from_millis(1);

/// Default bounded drain deadline on `Close`.
pub const DEFAULT_CLOSE_DRAIN_DEADLINE: Duration = Duration::from_millis(100);

/// Which dendritic operator variant a unit is configured with, and its
/// per-variant tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DendriticKind {
    /// No buffering, immediate pass-through
    Passive,
    /// Buffers events, emits their algebraic sum each tick
    TemporalSummation,
    /// Divisive inhibition pooling plus spatial decay
    Shunting(ShuntingConfig, BiophysicalConfig),
    /// Per-event saturation, shunting, and an NMDA-spike boost
    Active(ActiveNonlinearConfig, BiophysicalConfig),
}

impl Default for DendriticKind {
    fn default() -> Self {
        Self::Passive
    }
}

/// Validated, immutable per-unit configuration. Constructed only through
/// [`UnitConfig::new`], which performs every range check; a `Unit` built
/// from one of these never needs to re-validate its own parameters.
#[derive(Debug, Clone)]
pub struct UnitConfig {
    /// Opaque identity
    pub id: UnitId,
    /// Initial and baseline fire threshold
    pub threshold: f64,
    /// Per-tick multiplicative decay of the accumulator, in (0, 1]
    pub decay_rate: f64,
    /// Minimum duration between fires
    pub refractory_period: Duration,
    /// Scalar applied to the accumulator on fire to produce output magnitude
    pub fire_factor: f64,
    /// Homeostatic set point in Hz; 0 disables homeostasis
    pub target_firing_rate: f64,
    /// Gain of the homeostatic threshold controller; 0 disables homeostasis
    pub homeostasis_strength: f64,
    /// Window over which homeostatic firing rate is measured
    pub activity_window: Duration,
    /// STDP feedback configuration
    pub stdp_config: StdpConfig,
    /// Which dendritic operator this unit integrates through
    pub dendritic: DendriticKind,
    /// Bound on the per-unit scheduler
    pub max_scheduled_signals: usize,
    /// Bound on the inbound signal queue
    pub input_buffer_capacity: usize,
    /// Decay-tick cadence
    pub decay_interval: Duration,
    /// Bounded drain deadline on `Close`
    pub close_drain_deadline: Duration,
}

impl UnitConfig {
    /// Construct and validate a new unit configuration. Mirrors the
    /// teacher's `STDPParams::new` validated-constructor pattern in
    /// `plasticity.rs`, generalized to the full unit parameter set.
    pub fn new(id: impl Into<UnitId>, threshold: f64, decay_rate: f64) -> Result<Self> {
        let id = id.into();

        if !threshold.is_finite() {
            return Err(RuntimeError::invalid_parameter(
                "threshold",
                threshold.to_string(),
                "must be finite",
            ));
        }
        if !(decay_rate > 0.0 && decay_rate <= 1.0) {
            return Err(RuntimeError::invalid_parameter(
                "decay_rate",
                decay_rate.to_string(),
                "must be in (0, 1]",
            ));
        }

        Ok(Self {
            id,
            threshold,
            decay_rate,
            refractory_period: Duration::ZERO,
            fire_factor: 1.0,
            target_firing_rate: 0.0,
            homeostasis_strength: 0.0,
            activity_window: Duration::from_millis(5000),
            stdp_config: StdpConfig::disabled(),
            dendritic: DendriticKind::default(),
            max_scheduled_signals: DEFAULT_MAX_SCHEDULED_SIGNALS,
            input_buffer_capacity: DEFAULT_INPUT_BUFFER_CAPACITY,
            decay_interval: DEFAULT_DECAY_INTERVAL,
            close_drain_deadline: DEFAULT_CLOSE_DRAIN_DEADLINE,
        })
    }

    /// Builder: set the refractory period.
    pub fn with_refractory_period(mut self, period: Duration) -> Self {
        self.refractory_period = period;
        self
    }

    /// Builder: set the fire-factor scalar.
    pub fn with_fire_factor(mut self, fire_factor: f64) -> Self {
        self.fire_factor = fire_factor;
        self
    }

    /// Builder: enable homeostasis with the given target rate and gain.
    pub fn with_homeostasis(mut self, target_firing_rate: f64, strength: f64) -> Self {
        self.target_firing_rate = target_firing_rate;
        self.homeostasis_strength = strength;
        self
    }

    /// Builder: override the homeostatic activity window.
    pub fn with_activity_window(mut self, window: Duration) -> Self {
        self.activity_window = window;
        self
    }

    /// Builder: set the STDP configuration.
    pub fn with_stdp(mut self, stdp_config: StdpConfig) -> Self {
        self.stdp_config = stdp_config;
        self
    }

    /// Builder: select the dendritic operator variant.
    pub fn with_dendritic(mut self, dendritic: DendriticKind) -> Self {
        self.dendritic = dendritic;
        self
    }

    /// Builder: override the scheduler's bound.
    pub fn with_max_scheduled_signals(mut self, max: usize) -> Self {
        self.max_scheduled_signals = max;
        self
    }

    /// Builder: override the inbound queue's bound.
    pub fn with_input_buffer_capacity(mut self, capacity: usize) -> Self {
        self.input_buffer_capacity = capacity;
        self
    }

    /// Homeostasis is enabled iff either its target or strength is nonzero
    pub fn homeostasis_enabled(&self) -> bool {
        self.target_firing_rate != 0.0 || self.homeostasis_strength != 0.0
    }
}
