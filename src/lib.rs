//! Temporal-neuron runtime: per-unit signal integration, a pluggable
//! dendritic operator pipeline, a delayed-delivery scheduler, and the
//! homeostatic/STDP feedback controllers that close the adaptation loop.
//!
//! Each [`unit::Unit`] is a self-contained actor running on its own
//! thread, reachable only through a cloneable [`unit::UnitHandle`] and a
//! pair of object-safe callback traits ([`callbacks::NeuronCallbacks`],
//! [`callbacks::OutputCallback`]) — the core never owns a concrete
//! coordinator or synapse type, so cyclic unit graphs are wired entirely
//! through opaque handles.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod callbacks;
pub mod config;
pub mod dendrite;
pub mod error;
pub mod homeostatic;
pub mod ids;
pub mod metrics;
pub mod scheduler;
pub mod signal;
pub mod stdp;
pub mod time;
pub mod unit;

pub use config::{DendriticKind, UnitConfig};
pub use error::{Result, RuntimeError};
pub use ids::{SynapseId, UnitId};
pub use metrics::{HealthMetrics, QueueStats};
pub use scheduler::{SchedulerStats, SignalScheduler};
pub use signal::{IntegratedPotential, MembraneSnapshot, Signal};
pub use stdp::{PlasticityAdjustment, StdpConfig};
pub use time::{Clock, Duration, FakeClock, SystemClock, Time};
pub use unit::{Unit, UnitHandle, UnitState};

/// Runtime crate version for compatibility checking between embedders.
pub const RUNTIME_VERSION: u32 = 1;
