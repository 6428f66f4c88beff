//! Opaque identity types for units and synapses

use std::fmt;
use std::sync::Arc;

/// Opaque identifier for a unit (the temporal-neuron analogue of a neuron ID)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(Arc<str>);

impl UnitId {
    /// Create a new unit ID from any string-like value
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Borrow the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UnitId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for UnitId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Opaque identifier for an outward synapse, as seen from the unit side
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SynapseId(Arc<str>);

impl SynapseId {
    /// Create a new synapse ID from any string-like value
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Borrow the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SynapseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SynapseId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SynapseId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
