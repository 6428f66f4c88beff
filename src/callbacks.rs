//! Upward and outward callback bundles a unit uses to talk to whatever
//! embeds it, kept as object-safe traits so the core never owns a concrete
//! coordinator or synapse type.

use crate::ids::{SynapseId, UnitId};
use crate::stdp::PlasticityAdjustment;
use crate::time::Duration;
use std::fmt;

/// Criteria for filtering [`NeuronCallbacks::list_synapses`] results.
/// Intentionally minimal; embedders match on whatever subset they care
/// about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynapseQuery {
    /// Only synapses targeting this unit, if set
    pub target_id: Option<UnitId>,
}

/// Information about a synapse as reported by the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct SynapseInfo {
    /// The synapse's own identity
    pub id: SynapseId,
    /// The unit it delivers to
    pub target_id: UnitId,
    /// Its current weight
    pub weight: f64,
}

/// Opaque, coordinator-defined configuration handed to `create_synapse`.
/// The core never inspects this; it is a pass-through payload.
pub type SynapseConfig = std::collections::HashMap<String, String>;

/// Error surface for the upward callback bundle. Distinct from
/// [`crate::error::RuntimeError`] since these failures originate outside
/// the unit's own state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackError(pub String);

impl fmt::Display for CallbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for CallbackError {}

/// Upward callback bundle: the coordinator-facing surface a unit uses to
/// manage its own synapses and report state. Object-safe so a unit holds
/// it as `Arc<dyn NeuronCallbacks>`, never a concrete coordinator type.
pub trait NeuronCallbacks: Send + Sync {
    /// Ask the coordinator to create a new outward synapse.
    fn create_synapse(&self, config: SynapseConfig) -> Result<SynapseId, CallbackError>;

    /// Ask the coordinator to remove an outward synapse.
    fn delete_synapse(&self, id: &SynapseId) -> Result<(), CallbackError>;

    /// List synapses matching a query.
    fn list_synapses(&self, query: &SynapseQuery) -> Result<Vec<SynapseInfo>, CallbackError>;

    /// Release a chemical ligand into the extracellular matrix.
    fn release_chemical(&self, ligand: &str, concentration: f64) -> Result<(), CallbackError>;

    /// Emit an electrical signal of the given type with an opaque payload.
    fn send_electrical_signal(&self, signal_type: &str, payload: &[u8]);

    /// Report this unit's current activity level and connection count.
    fn report_health(&self, activity_level: f64, connection_count: usize);

    /// Query the coordinator-assigned spatial propagation delay to a target.
    fn get_spatial_delay(&self, target_id: &UnitId) -> Duration;

    /// Apply an STDP-derived weight adjustment to a synapse.
    fn apply_plasticity(
        &self,
        synapse_id: &SynapseId,
        adjustment: &PlasticityAdjustment,
    ) -> Result<(), CallbackError>;

    /// Read a synapse's current weight.
    fn get_synapse_weight(&self, id: &SynapseId) -> Result<f64, CallbackError>;

    /// Overwrite a synapse's weight.
    fn set_synapse_weight(&self, id: &SynapseId, weight: f64) -> Result<(), CallbackError>;

    /// Look up a synapse's full descriptor.
    fn get_synapse(&self, id: &SynapseId) -> Result<SynapseInfo, CallbackError>;

    /// Notify the coordinator that this unit's lifecycle state changed.
    fn report_state_change(&self, old: &str, new: &str);
}

/// Outward callback quadruple: one per outgoing synapse, the unit's view
/// of its own output edge.
pub trait OutputCallback: Send + Sync {
    /// Deliver an output signal along this synapse.
    fn transmit(&self, value: f64) -> Result<(), CallbackError>;

    /// This synapse's current weight.
    fn weight(&self) -> f64;

    /// This synapse's propagation delay; non-zero delays route through
    /// the scheduler instead of an immediate transmit.
    fn delay(&self) -> Duration;

    /// The unit this synapse delivers to.
    fn target_id(&self) -> UnitId;
}
